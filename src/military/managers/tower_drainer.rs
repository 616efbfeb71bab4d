use super::*;
use screeps::{Direction, Position};

/// Tanks inside the target room below this fraction of health fall back
/// toward the rally position.
pub const DRAIN_RETREAT_THRESHOLD: f32 = 0.5;

struct FormationPlan {
    slots: [Position; 4],
    intact: bool,
    leg: Option<Direction>,
}

/// Slots relative to the lead member and the shared next step. `None` when
/// the squad has no orientation to form up against.
fn plan_formation(squad: &Squad, living: &[LivingMember], ctx: &SquadTickContext) -> Result<Option<FormationPlan>, MilitaryError> {
    let (orientation, lead) = match (squad.orientation(), lead_member(living)) {
        (Some(orientation), Some(lead)) => (orientation, lead),
        _ => return Ok(None),
    };

    let lead_slot = lead.formation_slot.ok_or_else(|| squad.slot_not_assigned(&lead.name))?;
    let anchor = formation_anchor(lead.pos(), lead_slot, orientation).unwrap_or(lead.pos());
    let slots = quadrant_rally_positions(anchor, orientation);

    let placements = living
        .iter()
        .map(|member| slot_position(squad, member, &slots).map(|slot| (member.pos(), slot)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(FormationPlan {
        slots,
        intact: formation_intact(ctx.oracle, &placements),
        leg: direction_toward_target_room(ctx.oracle, lead.pos(), squad.target_room()),
    }))
}

fn slot_position(squad: &Squad, member: &LivingMember, slots: &[Position; 4]) -> Result<Position, MilitaryError> {
    member
        .formation_slot
        .and_then(|slot| slots.get(slot).copied())
        .ok_or_else(|| squad.slot_not_assigned(&member.name))
}

fn tank_step(squad: &Squad, member: &LivingMember, status: SquadStatus, ctx: &SquadTickContext) -> Option<Intent> {
    let handle = &member.handle;
    let target_room = squad.target_room();
    let in_target_room = member.pos().room_name() == target_room;

    let retreat = || {
        let rally_pos = squad.rally_pos()?;

        ctx.oracle
            .next_step_direction(member.pos(), rally_pos, PathOptions::range(1))
            .map(Intent::move_direction)
    };

    let heal_self = || {
        if handle.can_heal() && handle.is_damaged() {
            Some(Intent::heal(member.name.clone()))
        } else {
            None
        }
    };

    if in_target_room && handle.health_fraction() < DRAIN_RETREAT_THRESHOLD {
        return retreat().or_else(heal_self);
    }

    heal_self()
        .or_else(|| move_off_exit_tile(ctx.oracle, member.pos()))
        .or_else(|| travel_step(member, status, target_room, ctx))
}

fn medic_step(member: &LivingMember, allies: &[UnitHandle], lead_pos: Option<Position>, ctx: &SquadTickContext) -> Option<Intent> {
    if !member.handle.can_heal() {
        return None;
    }

    let heal = if ctx.features.heal_allies {
        most_damaged_ally(member.pos(), allies, HEAL_RANGE).map(|ally| Intent::heal(ally.name.clone()))
    } else if member.handle.is_damaged() {
        Some(Intent::heal(member.name.clone()))
    } else {
        None
    };

    heal.or_else(|| {
        let lead_pos = lead_pos?;

        if member.pos().get_range_to(lead_pos) <= HEAL_RANGE {
            return None;
        }

        ctx.oracle
            .next_step_direction(member.pos(), lead_pos, PathOptions::range(HEAL_RANGE))
            .map(Intent::move_direction)
    })
}

/// Rally into the quadrant, advance as one block led by slot 0, then drain:
/// tanks soak tower fire and step out to recover while medics keep them up.
pub fn orchestrate(squad: &mut Squad, living: &[LivingMember], status: SquadStatus, ctx: &SquadTickContext) -> Result<(), MilitaryError> {
    let target_room = squad.target_room();
    let allies = allies_of(living);
    let lead_pos = lead_member(living).map(|lead| lead.pos());

    let plan = if status == SquadStatus::Advancing {
        plan_formation(squad, living, ctx)?
    } else {
        None
    };

    for member in living {
        let intent = match status {
            SquadStatus::Rallying => match move_off_exit_tile(ctx.oracle, member.pos()) {
                Some(intent) => Some(intent),
                None => rally_step(squad, member, status, ctx)?,
            },
            SquadStatus::Advancing => match &plan {
                Some(plan) => {
                    let slot = slot_position(squad, member, &plan.slots)?;

                    move_into_formation(ctx.oracle, member.pos(), slot, plan.intact, plan.leg, status)
                }
                None => travel_step(member, status, target_room, ctx),
            },
            SquadStatus::Engaging => match member.role {
                SquadRole::TowerMedic => medic_step(member, &allies, lead_pos, ctx),
                _ => tank_step(squad, member, status, ctx),
            },
            SquadStatus::Disbanded => None,
        };

        queue(squad, member, intent)?;
    }

    Ok(())
}
