use crate::agent::{Agent, EpisodePhase};
use crate::config::{AgentConfig, CriticKind, NetworkConfig};
use crate::environment::{child_states, solitaire_reward, Environment, LinearBoard, PegRow};
use crate::error::LearnerError;
use crate::persistence::CriticSnapshot;
use crate::trainer::{play_episode, Trainer};

use super::{approx_eq, Countdown};

fn agent(board: LinearBoard, config: AgentConfig) -> Agent<LinearBoard> {
    Agent::new(config, Box::new(solitaire_reward(board))).unwrap()
}

fn play_winning_move(agent: &mut Agent<LinearBoard>, board: &LinearBoard, state: &PegRow) {
    let moves = board.legal_moves(state);
    let children = child_states(board, state, &moves).unwrap();
    agent.get_action(board, state, &moves, &children, false).unwrap();
}

#[test]
fn test_config_defaults() {
    let config = AgentConfig::default();
    assert_eq!(config.critic_kind, CriticKind::Table);
    assert_eq!(config.epsilon, 0.99);
    assert_eq!(config.epsilon_decay_param, 0.9);
    assert_eq!(config.network.hidden_layers, vec![15]);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    assert!(AgentConfig::default().with_epsilon(1.5).validate().is_err());
    assert!(AgentConfig::default().with_epsilon_decay_param(0.0).validate().is_err());
    assert!(AgentConfig::default().with_learning_rates(-0.1, 0.1).validate().is_err());

    let bad_network = AgentConfig::default()
        .with_critic(CriticKind::Network)
        .with_network(NetworkConfig {
            hidden_layers: vec![4, 0],
            ..NetworkConfig::default()
        });
    assert!(bad_network.validate().is_err());
    assert!(Agent::<LinearBoard>::new(bad_network, Box::new(|_: &PegRow| 0.0)).is_err());
}

#[test]
fn test_config_json_fills_defaults() {
    let config = AgentConfig::from_json_str(r#"{"critic_kind": "Network", "epsilon": 0.5}"#).unwrap();
    assert_eq!(config.critic_kind, CriticKind::Network);
    assert_eq!(config.epsilon, 0.5);
    assert_eq!(config.actor_discount, 0.9);

    let json = config.to_json_string().unwrap();
    assert_eq!(AgentConfig::from_json_str(&json).unwrap(), config);
    assert!(AgentConfig::from_json_str(r#"{"epsilon": 2.0}"#).is_err());
}

#[test]
fn test_epsilon_decays_linearly() {
    let board = LinearBoard::new(3);
    let mut agent = agent(board, AgentConfig::default().with_seed(1));
    let state = PegRow::parse("110").unwrap();

    play_winning_move(&mut agent, &board, &state);
    agent.end_of_episode(2000).unwrap();

    let expected = 0.99 - 0.99 / (2000.0 * 0.9);
    assert!(approx_eq(agent.epsilon(), expected, 1e-6));
    assert_eq!(agent.actor().epsilon(), agent.epsilon());
    assert_eq!(agent.episodes_completed(), 1);
}

#[test]
fn test_epsilon_floors_at_zero() {
    let board = LinearBoard::new(3);
    let mut agent = agent(board, AgentConfig::default().with_epsilon(0.5).with_seed(1));
    let state = PegRow::parse("110").unwrap();

    for _ in 0..3 {
        play_winning_move(&mut agent, &board, &state);
        agent.end_of_episode(1).unwrap();
    }
    assert_eq!(agent.epsilon(), 0.0);
    assert_eq!(agent.initial_epsilon(), 0.5);
}

#[test]
fn test_end_of_episode_rejects_zero_total() {
    let board = LinearBoard::new(3);
    let mut agent = agent(board, AgentConfig::default());
    let err = agent.end_of_episode(0).unwrap_err();
    assert!(matches!(err, LearnerError::InvalidParameter { .. }));
}

#[test]
fn test_terminal_transition_blocks_further_actions() {
    let board = LinearBoard::new(3);
    let mut agent = agent(board, AgentConfig::default().with_seed(2));
    let state = PegRow::parse("110").unwrap();

    assert_eq!(agent.phase(), EpisodePhase::Idle);
    play_winning_move(&mut agent, &board, &state);
    assert_eq!(agent.phase(), EpisodePhase::Terminal);

    let moves = board.legal_moves(&state);
    let children = child_states(&board, &state, &moves).unwrap();
    let err = agent.get_action(&board, &state, &moves, &children, false).unwrap_err();
    assert_eq!(err, LearnerError::EpisodeTerminated);

    agent.end_of_episode(10).unwrap();
    assert_eq!(agent.phase(), EpisodePhase::Idle);
    assert!(agent.get_action(&board, &state, &moves, &children, false).is_ok());
}

#[test]
fn test_begin_episode_twice() {
    let board = LinearBoard::new(6);
    let mut agent = agent(board, AgentConfig::default());
    let state = board.initial_state(&[1]).unwrap();

    agent.begin_episode(&board, &state).unwrap();
    assert_eq!(agent.begin_episode(&board, &state).unwrap_err(), LearnerError::EpisodeInProgress);

    agent.abort_episode();
    assert!(agent.begin_episode(&board, &state).is_ok());
}

#[test]
fn test_single_winning_move_updates_both_tables() {
    let board = LinearBoard::new(3);
    let mut agent = agent(board, AgentConfig::default().with_seed(4));
    let state = PegRow::parse("110").unwrap();

    play_winning_move(&mut agent, &board, &state);

    let moves = board.legal_moves(&state);
    assert!(approx_eq(agent.actor().value(&state, &moves[0]), 90.0, 1e-3));
    assert!(approx_eq(agent.critic().value(&board, &state).unwrap(), 100.0, 1e-3));
    assert_eq!(agent.critic().trajectory().len(), 1);

    agent.end_of_episode(100).unwrap();
    assert!(agent.actor().eligibility().is_empty());
    assert!(agent.critic().trajectory().is_empty());
}

#[test]
fn test_play_episode_reaches_terminal() {
    let board = LinearBoard::new(6);
    let mut agent = agent(board, AgentConfig::default().with_seed(9));
    let start = board.initial_state(&[1]).unwrap();

    let outcome = play_episode(&mut agent, &board, &start, false).unwrap();

    // every line of play from this start wins in four jumps
    assert_eq!(outcome.steps, 4);
    assert!(outcome.success);
    assert!(approx_eq(outcome.total_reward, 1003.0, 1e-3));
    assert_eq!(outcome.path.len(), 5);
    assert_eq!(outcome.path[0], start);
    assert!(board.is_terminal(&outcome.final_state));
    assert_eq!(agent.phase(), EpisodePhase::Terminal);
}

#[test]
fn test_trainer_counts_victories_and_decays() {
    let board = LinearBoard::new(6);
    let config = AgentConfig::default().with_seed(3);
    let start = board.initial_state(&[1]).unwrap();
    let mut trainer = Trainer::new(agent(board, config), board, start).with_log_every(10);

    let report = trainer.train(20).unwrap();

    assert_eq!(report.episodes.len(), 20);
    assert_eq!(report.victories, 20);
    assert!(approx_eq(report.summary.success_rate, 1.0, 1e-6));
    assert_eq!(report.episodes[0].epsilon, 0.99);
    // exploration runs out after 90% of the run
    assert_eq!(trainer.agent.epsilon(), 0.0);
    assert!(report.episodes[17].epsilon > 0.0);
    assert_eq!(trainer.metrics().episode_count(), 20);
    assert_eq!(trainer.metrics().total_steps(), 80);
}

#[test]
fn test_evaluation_keeps_epsilon() {
    let board = LinearBoard::new(6);
    let start = board.initial_state(&[1]).unwrap();
    let mut trainer = Trainer::new(agent(board, AgentConfig::default().with_seed(3)), board, start);

    trainer.train(5).unwrap();
    let epsilon = trainer.agent.epsilon();
    let completed = trainer.agent.episodes_completed();

    let outcome = trainer.evaluate().unwrap();
    assert!(outcome.success);
    assert_eq!(trainer.agent.epsilon(), epsilon);
    assert_eq!(trainer.agent.episodes_completed(), completed);
    assert_eq!(trainer.agent.phase(), EpisodePhase::Idle);
}

#[test]
fn test_network_agent_trains() {
    let board = LinearBoard::new(6);
    let config = AgentConfig::default()
        .with_critic(CriticKind::Network)
        .with_network(NetworkConfig {
            hidden_layers: vec![8],
            ..NetworkConfig::default()
        })
        .with_seed(12);
    let start = board.initial_state(&[1]).unwrap();
    let mut trainer = Trainer::new(agent(board, config), board, start);

    let report = trainer.train(10).unwrap();
    assert_eq!(report.episodes.len(), 10);
    assert_eq!(trainer.agent.critic_kind(), CriticKind::Network);
}

#[test]
fn test_snapshot_restore() {
    let board = LinearBoard::new(6);
    let start = board.initial_state(&[1]).unwrap();
    let mut trainer = Trainer::new(agent(board, AgentConfig::default().with_seed(8)), board, start.clone());
    trainer.train(10).unwrap();
    let trained = trainer.into_agent();

    let snapshot = trained.snapshot();
    assert!(matches!(snapshot.critic, CriticSnapshot::Table(_)));
    assert_eq!(snapshot.episodes_completed, 10);

    let mut fresh = agent(board, AgentConfig::default());
    fresh.restore(snapshot).unwrap();

    assert_eq!(fresh.epsilon(), trained.epsilon());
    assert_eq!(fresh.episodes_completed(), 10);
    assert_eq!(
        fresh.actor().state_action_values().len(),
        trained.actor().state_action_values().len()
    );
    assert_eq!(
        fresh.critic().value(&board, &start).unwrap(),
        trained.critic().value(&board, &start).unwrap()
    );
}

#[test]
fn test_restore_rejects_mismatched_or_open_episode() {
    let board = LinearBoard::new(6);
    let start = board.initial_state(&[1]).unwrap();
    let table_agent = agent(board, AgentConfig::default());

    let mut network_agent = agent(board, AgentConfig::default().with_critic(CriticKind::Network));
    assert!(matches!(
        network_agent.restore(table_agent.snapshot()).unwrap_err(),
        LearnerError::InvalidParameter { .. }
    ));

    let mut busy = agent(board, AgentConfig::default());
    busy.begin_episode(&board, &start).unwrap();
    assert_eq!(busy.restore(table_agent.snapshot()).unwrap_err(), LearnerError::EpisodeInProgress);
}

#[test]
fn test_failed_episode_leaves_agent_idle() {
    let config = AgentConfig::default().with_critic(CriticKind::Network);
    let mut agent = Agent::<Countdown>::new(config, Box::new(|_: &u32| 0.0)).unwrap();

    let err = play_episode(&mut agent, &Countdown, &6, false).unwrap_err();
    assert_eq!(err, LearnerError::EncodingUnavailable);
    assert!(!err.aborts_episode());
    assert!(LearnerError::EpisodeTerminated.aborts_episode());
    assert_eq!(agent.phase(), EpisodePhase::Idle);
}

#[test]
fn test_end_of_episode_requires_open_episode() {
    let board = LinearBoard::new(3);
    let mut agent = agent(board, AgentConfig::default().with_seed(1));

    assert_eq!(agent.end_of_episode(10).unwrap_err(), LearnerError::NoEpisodeInProgress);
    assert_eq!(agent.end_evaluation_episode().unwrap_err(), LearnerError::NoEpisodeInProgress);
    assert_eq!(agent.epsilon(), 0.99);
    assert_eq!(agent.episodes_completed(), 0);

    play_winning_move(&mut agent, &board, &PegRow::parse("110").unwrap());
    agent.end_of_episode(10).unwrap();
    let epsilon = agent.epsilon();

    assert_eq!(agent.end_of_episode(10).unwrap_err(), LearnerError::NoEpisodeInProgress);
    assert_eq!(agent.epsilon(), epsilon);
    assert_eq!(agent.episodes_completed(), 1);
}

#[test]
fn test_restore_rejects_out_of_range_epsilon() {
    let board = LinearBoard::new(6);
    let source = agent(board, AgentConfig::default());
    let mut target = agent(board, AgentConfig::default().with_epsilon(0.3));

    for epsilon in [1.5, -0.1, f32::NAN] {
        let mut snapshot = source.snapshot();
        snapshot.epsilon = epsilon;
        assert!(matches!(
            target.restore(snapshot).unwrap_err(),
            LearnerError::InvalidParameter { .. }
        ));
    }
    assert_eq!(target.epsilon(), 0.3);
}

#[test]
fn test_report_carries_remaining_pegs() {
    let board = LinearBoard::new(8);
    let start = board.initial_state(&[2]).unwrap();
    let mut trainer = Trainer::new(agent(board, AgentConfig::default().with_seed(13)), board, start.clone());

    let report = trainer.train(15).unwrap();
    for summary in &report.episodes {
        let pegs = summary.score.unwrap();
        assert!(pegs >= 2.0);
        assert_eq!(summary.steps as f32 + pegs, start.remaining_pegs() as f32);
    }

    let outcome = trainer.evaluate().unwrap();
    assert_eq!(outcome.score, Some(outcome.final_state.remaining_pegs() as f32));
}
