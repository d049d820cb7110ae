use super::entities::PlayerId;

/// Pick the judge for the next round.
///
/// Rotation follows `player_ids` order and wraps around. A current judge
/// that is no longer in the list (e.g. they just left) restarts the
/// rotation at the first player.
pub fn next_czar(player_ids: &[PlayerId], current: Option<&PlayerId>) -> Option<PlayerId> {
    if player_ids.len() <= 1 {
        return None;
    }

    let next = current
        .and_then(|czar| player_ids.iter().position(|id| id == czar))
        .and_then(|idx| player_ids.get(idx + 1))
        .unwrap_or(&player_ids[0]);

    Some(next.clone())
}
