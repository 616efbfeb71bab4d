use super::*;

/// Exit tile, melee on the focus target or anything adjacent, rally, travel,
/// then chase.
pub fn orchestrate(squad: &mut Squad, living: &[LivingMember], status: SquadStatus, ctx: &SquadTickContext) -> Result<(), MilitaryError> {
    let target_room = squad.target_room();
    let allies = allies_of(living);
    let best = best_attack_target(ctx.threats.hostiles_in(target_room), &allies, target_room);

    for member in living {
        let local = ctx.threats.hostiles_in(member.pos().room_name());

        let intent = move_off_exit_tile(ctx.oracle, member.pos())
            .or_else(|| melee_attack_step(member, best, local))
            .map(Ok)
            .or_else(|| rally_step(squad, member, status, ctx).transpose())
            .transpose()?
            .or_else(|| travel_step(member, status, target_room, ctx))
            .or_else(|| approach_step(member, best, MELEE_RANGE, ctx))
            .or_else(|| approach_step(member, closest_hostile(local, member.pos()), MELEE_RANGE, ctx));

        queue(squad, member, intent)?;
    }

    Ok(())
}
