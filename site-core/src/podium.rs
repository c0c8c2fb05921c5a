use site_types::{LeaderboardPlayer, PrizeTier};

/// Pairs the first three entries, in server order, with their prize tier.
/// No sorting or tie-breaking happens here.
pub fn podium(players: &[LeaderboardPlayer]) -> Vec<(PrizeTier, &LeaderboardPlayer)> {
    players
        .iter()
        .enumerate()
        .filter_map(|(index, player)| PrizeTier::for_position(index).map(|tier| (tier, player)))
        .collect()
}
