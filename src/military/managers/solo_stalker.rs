use super::*;

/// Heals itself when badly hurt, keeps melee hostiles at arm's length and
/// otherwise shoots, travels and closes to ranged distance.
pub fn orchestrate(squad: &mut Squad, living: &[LivingMember], status: SquadStatus, ctx: &SquadTickContext) -> Result<(), MilitaryError> {
    let target_room = squad.target_room();
    let allies = allies_of(living);
    let best = best_attack_target(ctx.threats.hostiles_in(target_room), &allies, target_room);

    for member in living {
        let local = ctx.threats.hostiles_in(member.pos().room_name());

        let intent = self_preservation_step(member)
            .or_else(|| move_off_exit_tile(ctx.oracle, member.pos()))
            .or_else(|| kite_step(member, local, ctx))
            .or_else(|| ranged_attack_step(member, best, local))
            .map(Ok)
            .or_else(|| rally_step(squad, member, status, ctx).transpose())
            .transpose()?
            .or_else(|| travel_step(member, status, target_room, ctx))
            .or_else(|| approach_step(member, best.or_else(|| closest_hostile(local, member.pos())), RANGED_RANGE, ctx))
            .or_else(|| heal_self_step(member, local, ctx));

        queue(squad, member, intent)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::military::intent::{IntentAction, IntentTarget};
    use crate::testing::*;

    fn stalker_squad(registry: &mut FakeRegistry, at: screeps::Position) -> Squad {
        let mut squad = new_squad(SquadArchetype::SoloStalker, "W3N1");
        SquadArchetype::SoloStalker.add_member(&mut squad, UnitName::from("stalker"));
        registry.add(ranged_unit("stalker", at));
        squad
    }

    #[test]
    fn stalker_shoots_target_in_range() {
        let oracle = FakeOracle::new();
        let mut registry = FakeRegistry::new();
        let mut threats = ThreatMap::new();
        let features = MilitaryFeatures::default();

        let mut squad = stalker_squad(&mut registry, pos(20, 20, "W3N1"));
        add_hostile(&mut threats, hostile("target", pos(23, 20, "W3N1"), 100));

        run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)).unwrap();

        let intents = &squad.members()[0].intents;

        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].action, IntentAction::RangedAttack);
        assert_eq!(intents[0].target, IntentTarget::Hostile(TargetId::new("target")));
    }

    #[test]
    fn stalker_kites_close_melee_hostile() {
        let oracle = FakeOracle::new();
        let mut registry = FakeRegistry::new();
        let mut threats = ThreatMap::new();
        let mut features = MilitaryFeatures::default();

        let mut squad = stalker_squad(&mut registry, pos(20, 20, "W3N1"));
        add_hostile(&mut threats, melee_hostile("brute", pos(21, 20, "W3N1"), 100));

        run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)).unwrap();

        assert_eq!(squad.members()[0].intents[0].action, IntentAction::Move);

        features.kiting = false;
        run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)).unwrap();

        assert_eq!(squad.members()[0].intents[0].action, IntentAction::RangedAttack);
    }

    #[test]
    fn stalker_trades_shots_with_ranged_hostiles_instead_of_kiting() {
        let oracle = FakeOracle::new();
        let mut registry = FakeRegistry::new();
        let mut threats = ThreatMap::new();
        let features = MilitaryFeatures::default();

        let mut squad = stalker_squad(&mut registry, pos(20, 20, "W3N1"));
        add_hostile(&mut threats, hostile("archer", pos(22, 20, "W3N1"), 100));
        add_hostile(&mut threats, melee_hostile("brute", pos(23, 20, "W3N1"), 100));

        run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)).unwrap();

        assert_eq!(squad.members()[0].intents[0].action, IntentAction::RangedAttack);
    }

    #[test]
    fn badly_hurt_stalker_heals_first() {
        let oracle = FakeOracle::new();
        let mut registry = FakeRegistry::new();
        let mut threats = ThreatMap::new();
        let features = MilitaryFeatures::default();

        let mut squad = stalker_squad(&mut registry, pos(20, 20, "W3N1"));
        let mut hurt = ranged_unit("stalker", pos(20, 20, "W3N1"));
        hurt.hits = hurt.hits_max / 4;
        registry.add(hurt);
        add_hostile(&mut threats, hostile("target", pos(23, 20, "W3N1"), 100));

        run_squad(&mut squad, &context(&oracle, &registry, &threats, &features)).unwrap();

        assert_eq!(squad.members()[0].intents, vec![Intent::heal(UnitName::from("stalker"))]);
    }

    #[test]
    fn idle_stalker_heals_when_hostiles_are_present() {
        let oracle = FakeOracle::new();
        let mut registry = FakeRegistry::new();
        let mut threats = ThreatMap::new();
        let features = MilitaryFeatures::default();

        let mut squad = stalker_squad(&mut registry, pos(20, 20, "W3N1"));
        add_hostile(&mut threats, hostile("unreachable", pos(20, 24, "W3N1"), 100));

        let mut walled = oracle.clone();
        walled.block_paths();

        run_squad(&mut squad, &context(&walled, &registry, &threats, &features)).unwrap();

        assert_eq!(squad.members()[0].intents, vec![Intent::heal(UnitName::from("stalker"))]);
    }
}
