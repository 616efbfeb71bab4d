pub use log::LevelFilter::*;

struct ConsoleLog;

impl log::Log for ConsoleLog {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    #[cfg(target_arch = "wasm32")]
    fn log(&self, record: &log::Record<'_>) {
        web_sys::console::log_1(&format!("{}", record.args()).into());
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn log(&self, record: &log::Record<'_>) {
        println!("{}", record.args());
    }

    fn flush(&self) {}
}

pub fn setup_logging(verbosity: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .level(verbosity)
        .format(|out, message, record| out.finish(format_args!("({}) {}: {}", record.level(), record.target(), message)))
        .chain(Box::new(ConsoleLog) as Box<dyn log::Log>)
        .apply()
}
