//! Example: epsilon-greedy Q-learning on a short corridor
//!
//! The agent starts at the left end of a six-cell corridor and is paid 1.0
//! for reaching the right end. Run with `RUST_LOG=gradrl_learner=debug` to
//! see every update.

use gradrl_core::{
    Action, ActionSet, ActionValueFunction, EpsilonGreedy, IndexFeatures, LinearQFunction, Policy,
    State, Transition,
};
use gradrl_learner::{LearnerConfig, Persist, QLearner, TraceKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

const CELLS: usize = 6;

fn step(cell: usize, action: &Action) -> (usize, f64, bool) {
    let next = if action.get(0) == Some(0.0) {
        (cell + 1).min(CELLS - 1)
    } else {
        cell.saturating_sub(1)
    };
    let done = next == CELLS - 1;
    (next, if done { 1.0 } else { 0.0 }, done)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let actions = ActionSet::discrete(2)?;
    let q = LinearQFunction::per_action(IndexFeatures::new(CELLS), actions);
    let config = LearnerConfig::default()
        .with_learning_rate(0.3)
        .with_gamma(0.9)
        .with_traces(0.7, TraceKind::Replacing);
    let mut learner = QLearner::q_learning(q, config)?;

    let mut rng = StdRng::seed_from_u64(7);
    let mut policy = EpsilonGreedy::new(0.3)?;

    for episode in 0..200 {
        learner.new_episode();
        let mut cell = 0;
        let mut steps = 0;

        loop {
            let state = State::from([cell as f64]);
            let action = policy.select(learner.function(), &state, &mut rng)?;

            let (next, reward, done) = step(cell, &action);
            let transition = Transition::new(state, action, reward, [next as f64]).with_terminal(done);
            learner.update(&transition)?;
            steps += 1;

            if done || steps >= 100 {
                break;
            }
            cell = next;
        }

        // explore less as the values settle
        policy.set_epsilon(policy.epsilon() * 0.99);

        if (episode + 1) % 50 == 0 {
            println!(
                "Episode {}: Steps = {}, epsilon = {:.3}, mean |TD error| = {:.4}",
                episode + 1,
                steps,
                policy.epsilon(),
                learner.stats().mean_abs_td_error
            );
        }
    }

    println!("\nGreedy values:");
    for cell in 0..CELLS - 1 {
        let (best, value) = learner.function().best_action(&State::from([cell as f64]))?;
        println!("  cell {cell}: {value:.3} (action {best})");
    }

    let path = std::env::temp_dir().join("gradrl-chain-walk.json");
    learner.save(&path).await?;
    println!("\nCheckpoint written to {}", path.display());

    Ok(())
}
