use super::*;
use log::*;

/// Holds no rally. Walks home, fights whatever is there and declares the
/// objective resolved once the room is visible and clear.
pub fn orchestrate(squad: &mut Squad, living: &[LivingMember], status: SquadStatus, ctx: &SquadTickContext) -> Result<(), MilitaryError> {
    let home_room = squad.target_room();

    if status == SquadStatus::Engaging && ctx.threats.is_clear(home_room) {
        info!("Room {} is clear, standing down defenders - Squad: {}", home_room, squad.id());

        squad.resolve_objective();

        return Ok(());
    }

    let allies = allies_of(living);
    let best = best_attack_target(ctx.threats.hostiles_in(home_room), &allies, home_room);

    for member in living {
        let local = ctx.threats.hostiles_in(member.pos().room_name());

        let intent = move_off_exit_tile(ctx.oracle, member.pos())
            .or_else(|| melee_attack_step(member, best, local))
            .or_else(|| travel_step(member, status, home_room, ctx))
            .or_else(|| approach_step(member, best.or_else(|| closest_hostile(local, member.pos())), MELEE_RANGE, ctx));

        queue(squad, member, intent)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::military::intent::IntentAction;
    use crate::testing::*;

    #[test]
    fn defender_stands_down_when_home_is_clear() {
        let oracle = FakeOracle::new();
        let mut registry = FakeRegistry::new();
        let mut threats = ThreatMap::new();
        let features = MilitaryFeatures::default();

        let mut squad = new_squad(SquadArchetype::DomesticDefender, "W1N1");
        SquadArchetype::DomesticDefender.add_member(&mut squad, UnitName::from("defender"));
        registry.add(melee_unit("defender", pos(20, 20, "W1N1")));
        add_hostile(&mut threats, melee_hostile("raider", pos(21, 20, "W1N1"), 100));

        run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)).unwrap();

        assert_eq!(squad.members()[0].intents[0].action, IntentAction::MeleeAttack);

        threats.insert(room("W1N1"), Default::default());

        assert_eq!(run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)), Ok(SquadStatus::Engaging));
        assert!(squad.objective_resolved());
        assert_eq!(run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)), Ok(SquadStatus::Disbanded));
    }

    #[test]
    fn defender_holds_when_home_is_not_visible() {
        let oracle = FakeOracle::new();
        let mut registry = FakeRegistry::new();
        let threats = ThreatMap::new();
        let features = MilitaryFeatures::default();

        let mut squad = new_squad(SquadArchetype::DomesticDefender, "W1N1");
        SquadArchetype::DomesticDefender.add_member(&mut squad, UnitName::from("defender"));
        registry.add(melee_unit("defender", pos(20, 20, "W1N1")));

        run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)).unwrap();

        assert!(!squad.objective_resolved());
        assert!(squad.members()[0].intents.is_empty());
    }
}
