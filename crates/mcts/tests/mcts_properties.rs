//! Property-based tests for the tree search.
//!
//! These check the structural invariants that must hold for any position,
//! seed and simulation budget:
//! - every simulation visits the root exactly once
//! - expanded nodes hold exactly their legal moves as children
//! - an expanded node has one visit more than its children combined
//! - the same seed always builds the same tree

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ucb_core::GameState;
use ucb_mcts::{games::TicTacToe, MctsConfig, RandomPolicy, SearchEngine, Tree};

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

/// Generate a random seed for the rollout policy
fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Generate a random number of simulations (1-300 for fast tests)
fn arb_simulations() -> impl Strategy<Value = usize> {
    1usize..300
}

/// Generate a random tic-tac-toe position by making random moves
fn arb_tictactoe_position() -> impl Strategy<Value = TicTacToe> {
    (0usize..9, arb_seed()).prop_map(|(num_moves, seed)| {
        let mut state = TicTacToe::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..num_moves {
            if state.is_terminal() {
                break;
            }
            let moves = state.legal_moves();
            let idx = rand::Rng::gen_range(&mut rng, 0..moves.len());
            state = state.apply(moves[idx]).expect("legal move");
        }

        state
    })
}

fn build(state: &TicTacToe, seed: u64, simulations: usize) -> Tree<TicTacToe> {
    let policy = RandomPolicy::new(ChaCha8Rng::seed_from_u64(seed));
    let mut engine = SearchEngine::new(MctsConfig::with_simulations(simulations), policy);
    engine
        .build_tree(state.clone(), simulations)
        .expect("tic-tac-toe search cannot fail");
    engine.take_tree().expect("tree was just built")
}

// =============================================================================
// Visit accounting
// =============================================================================

proptest! {
    /// After N simulations from a fresh root, the root has N visits
    #[test]
    fn prop_visit_conservation(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_tictactoe_position()
    ) {
        let tree = build(&state, seed, simulations);
        prop_assert_eq!(tree.root().visits() as usize, simulations);
    }

    /// Expanded nodes have exactly one visit more than their children
    #[test]
    fn prop_first_visit_is_rollout_only(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_tictactoe_position()
    ) {
        let tree = build(&state, seed, simulations);

        for (id, node) in tree.iter() {
            if !node.is_expanded() {
                continue;
            }
            let child_visits: u32 = node
                .children()
                .iter()
                .map(|(_, child)| tree.get(*child).visits())
                .sum();
            prop_assert_eq!(
                node.visits(),
                child_visits + 1,
                "node {:?} has {} visits but children sum to {}",
                id,
                node.visits(),
                child_visits
            );
        }
    }

    /// Each node's win sum is bounded by its visits
    #[test]
    fn prop_win_sum_bounded(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_tictactoe_position()
    ) {
        let tree = build(&state, seed, simulations);

        for (_, node) in tree.iter() {
            prop_assert!(node.win_sum().abs() <= node.visits() as f32);
            if let Some(average) = node.average_value() {
                prop_assert!((-1.0..=1.0).contains(&average));
            }
        }
    }
}

// =============================================================================
// Tree shape
// =============================================================================

proptest! {
    /// Children of an expanded node are exactly its legal moves, ascending
    #[test]
    fn prop_children_match_legal_moves(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_tictactoe_position()
    ) {
        let tree = build(&state, seed, simulations);

        for (id, node) in tree.iter() {
            if node.is_terminal() {
                prop_assert!(!node.is_expanded(), "terminal node {:?} was expanded", id);
            }
            if node.is_expanded() {
                let keys: Vec<_> = node.children().iter().map(|(mv, _)| *mv).collect();
                prop_assert_eq!(keys, node.state().legal_moves());
            }
        }
    }

    /// Every child's state is its parent's state plus the child's move
    #[test]
    fn prop_child_states_follow_moves(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_tictactoe_position()
    ) {
        let tree = build(&state, seed, simulations);

        for (id, node) in tree.iter() {
            for &(mv, child) in node.children() {
                let child_node = tree.get(child);
                prop_assert_eq!(child_node.parent(), Some(id));
                prop_assert_eq!(child_node.state(), &node.state().apply(mv).unwrap());
            }
        }
    }
}

// =============================================================================
// Determinism
// =============================================================================

proptest! {
    /// Same seed and budget should produce identical trees
    #[test]
    fn prop_deterministic(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_tictactoe_position()
    ) {
        let tree1 = build(&state, seed, simulations);
        let tree2 = build(&state, seed, simulations);

        prop_assert_eq!(tree1.len(), tree2.len());
        for ((_, a), (_, b)) in tree1.iter().zip(tree2.iter()) {
            prop_assert_eq!(a.stats(), b.stats());
            prop_assert_eq!(a.children(), b.children());
        }
        prop_assert_eq!(tree1.best_move(), tree2.best_move());
    }

    /// Best move is a legal move with the highest average among visited children
    #[test]
    fn prop_best_move_is_max_average(
        seed in arb_seed(),
        simulations in 2usize..300,
        state in arb_tictactoe_position()
    ) {
        if state.is_terminal() {
            return Ok(());
        }

        let tree = build(&state, seed, simulations);
        let best = tree.best_move().expect("expanded root has a visited child");
        prop_assert!(state.legal_moves().contains(&best));

        let best_average = tree
            .root_move_stats()
            .iter()
            .find(|stats| stats.action == best)
            .and_then(|stats| stats.average_value)
            .expect("best move was visited");
        for stats in tree.root_move_stats() {
            if let Some(average) = stats.average_value {
                prop_assert!(average <= best_average);
                if average == best_average {
                    prop_assert!(stats.action >= best);
                }
            }
        }
    }
}
