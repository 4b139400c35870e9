use peg_learner::{
    agent::{Agent, EpisodePhase},
    config::{AgentConfig, CriticKind, NetworkConfig},
    environment::{solitaire_reward, Environment, LinearBoard, PegRow},
    metrics::MetricsTracker,
    optimizer::OptimizerKind,
    persistence::PolicySnapshot,
    trainer::Trainer,
};

fn trainer(board: LinearBoard, empty: &[usize], config: AgentConfig) -> Trainer<LinearBoard> {
    let agent = Agent::new(config, Box::new(solitaire_reward(board))).unwrap();
    let start = board.initial_state(empty).unwrap();
    Trainer::new(agent, board, start)
}

#[test]
fn test_end_to_end_training() {
    let board = LinearBoard::new(8);
    let mut trainer = trainer(board, &[3], AgentConfig::default().with_seed(2024)).with_log_every(50);

    let report = trainer.train(300).unwrap();

    assert_eq!(report.episodes.len(), 300);
    assert!(report.victories > 0);
    assert_eq!(trainer.agent.epsilon(), 0.0);
    assert!(report.episodes.iter().all(|e| e.steps >= 1));

    let outcome = trainer.evaluate().unwrap();
    assert!(board.is_terminal(&outcome.final_state));
    assert_eq!(outcome.path.len(), outcome.steps + 1);
    assert_eq!(trainer.agent.phase(), EpisodePhase::Idle);
}

#[test]
fn test_network_critic_with_adam() {
    let board = LinearBoard::new(8);
    let config = AgentConfig::default()
        .with_critic(CriticKind::Network)
        .with_network(NetworkConfig {
            hidden_layers: vec![10, 5],
            optimizer: OptimizerKind::Adam,
            learning_rate: 0.01,
            ..NetworkConfig::default()
        })
        .with_seed(77);
    let mut trainer = trainer(board, &[4], config);

    let report = trainer.train(40).unwrap();
    assert_eq!(report.episodes.len(), 40);

    let start = board.initial_state(&[4]).unwrap();
    let value = trainer.agent.critic().value(&board, &start).unwrap();
    assert!(value.is_finite());
}

#[test]
fn test_snapshot_files() {
    let board = LinearBoard::new(6);
    let mut trainer = trainer(board, &[1], AgentConfig::default().with_seed(5));
    trainer.train(25).unwrap();
    let trained = trainer.into_agent();

    let dir = tempfile::tempdir().unwrap();
    let bin_path = dir.path().join("policy.bin");
    let json_path = dir.path().join("policy.json");

    let snapshot = trained.snapshot();
    snapshot.save_bincode(&bin_path).unwrap();
    snapshot.save_json(&json_path).unwrap();

    for loaded in [
        PolicySnapshot::<PegRow, _>::load_bincode(&bin_path).unwrap(),
        PolicySnapshot::load_json(&json_path).unwrap(),
    ] {
        let mut restored = Agent::<LinearBoard>::new(AgentConfig::default(), Box::new(solitaire_reward(board))).unwrap();
        restored.restore(loaded).unwrap();

        assert_eq!(restored.epsilon(), trained.epsilon());
        assert_eq!(restored.episodes_completed(), 25);
        for (key, value) in trained.actor().state_action_values().iter() {
            assert_eq!(restored.actor().value(&key.state, &key.action), *value);
        }
    }
}

#[test]
fn test_network_snapshot_restores_predictions() {
    let board = LinearBoard::new(6);
    let config = AgentConfig::default().with_critic(CriticKind::Network).with_seed(31);
    let mut trainer = trainer(board, &[1], config.clone());
    trainer.train(5).unwrap();
    let trained = trainer.into_agent();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network_policy.bin");
    trained.snapshot().save_bincode(&path).unwrap();

    let mut restored = Agent::<LinearBoard>::new(config, Box::new(solitaire_reward(board))).unwrap();
    restored.restore(PolicySnapshot::load_bincode(&path).unwrap()).unwrap();

    let start = board.initial_state(&[1]).unwrap();
    assert_eq!(
        restored.critic().value(&board, &start).unwrap(),
        trained.critic().value(&board, &start).unwrap()
    );
}

#[test]
fn test_metrics_persist() {
    let board = LinearBoard::new(6);
    let mut trainer = trainer(board, &[1], AgentConfig::default().with_seed(6)).with_history_size(8);
    trainer.train(12).unwrap();

    let metrics = trainer.metrics();
    assert_eq!(metrics.episode_count(), 12);
    assert_eq!(metrics.metrics().episode_rewards.len(), 8);
    assert_eq!(metrics.avg_episode_reward(4), Some(1003.0));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.json");
    let path = path.to_str().unwrap();
    metrics.save(path).unwrap();

    let mut loaded = MetricsTracker::default();
    loaded.load(path).unwrap();
    assert_eq!(loaded.metrics(), metrics.metrics());
}
