//! End-to-end workflow tests: configuration files, refitting, seeding and
//! checkpoints.

use bagging_rust::*;

use ndarray::array;
use tempfile::TempDir;

mod common;
use common::*;

#[test]
fn test_config_file_to_trained_ensemble() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bagging.toml");

    let config = test_config(2, 3, 3);
    config.save_to_file(&path).unwrap();
    let loaded = EnsembleConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);

    let (inputs, targets) = create_test_data_classification(48, 4);
    let train = DataLoader::new(inputs, targets, 16).unwrap();
    let mut ensemble = BaggingClassifier::new(loaded, |i| Linear::with_seed(2, 3, i as u64)).unwrap();
    let mut reporter = RecordingReporter::new();
    ensemble.fit_with_reporter(&train, &mut reporter).unwrap();

    // 2 estimators x 3 epochs x 3 batches, log_interval 1.
    assert_eq!(reporter.batches().len(), 18);
    assert_eq!(reporter.started(), &[0, 1]);
    assert_eq!(reporter.finished(), &[0, 1]);
}

#[test]
fn test_refit_restarts_epoch_counter_and_continues_training() {
    let (inputs, targets) = create_test_data_regression(32, 6);
    let train = DataLoader::new(inputs, targets, 16).unwrap();
    let mut ensemble =
        BaggingRegressor::new(test_config(2, 1, 2), |i| Linear::with_seed(2, 1, i as u64)).unwrap();

    ensemble.fit_with_reporter(&train, &mut RecordingReporter::new()).unwrap();
    let after_first = parameter_snapshot(ensemble.estimators());

    let mut reporter = RecordingReporter::new();
    ensemble.fit_with_reporter(&train, &mut reporter).unwrap();
    assert_ne!(parameter_snapshot(ensemble.estimators()), after_first);
    assert_eq!(reporter.batches()[0].epoch, 0);
    assert_eq!(ensemble.histories().len(), 2);
    assert_eq!(ensemble.state(), EnsembleState::Trained);
}

fn seeded_run(random_seed: u64) -> Vec<Vec<ndarray::Array2<f64>>> {
    let (inputs, targets) = create_test_data_classification(60, 9);
    let train = DataLoader::new(inputs, targets, 8).unwrap().with_shuffle(true).with_seed(4);

    let mut config = test_config(3, 3, 2);
    config.random_seed = Some(random_seed);
    let mut ensemble = BaggingClassifier::new(config, |i| Linear::with_seed(2, 3, i as u64)).unwrap();
    ensemble.fit_with_reporter(&train, &mut RecordingReporter::new()).unwrap();
    parameter_snapshot(ensemble.estimators())
}

#[test]
fn test_seeded_fit_is_reproducible() {
    assert_eq!(seeded_run(1), seeded_run(1));
    assert_ne!(seeded_run(1), seeded_run(2));
}

#[test]
fn test_checkpoint_after_fit() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ensemble.ckpt");

    let (inputs, targets) = create_test_data_classification(30, 12);
    let train = DataLoader::new(inputs, targets, 10).unwrap();
    let mut trained = BaggingClassifier::try_new(test_config(2, 3, 2), |i| {
        Mlp::builder(2, 4, 3).seed(i as u64).build()
    })
    .unwrap();
    trained.fit_with_reporter(&train, &mut RecordingReporter::new()).unwrap();
    trained.save_checkpoint(&path).unwrap();

    let mut restored = BaggingClassifier::try_new(test_config(2, 3, 2), |i| {
        Mlp::builder(2, 4, 3).seed(1000 + i as u64).build()
    })
    .unwrap();
    restored.load_checkpoint(&path).unwrap();

    let x = array![[0.0, 0.0], [-2.0, 0.1], [0.3, 2.2]];
    assert_eq!(trained.forward(x.view()).unwrap(), restored.forward(x.view()).unwrap());
    assert_eq!(restored.config(), trained.config());
    assert_eq!(restored.state(), EnsembleState::Trained);
}

#[test]
fn test_gpu_configuration_is_not_implemented() {
    let result = ConfigBuilder::new().device_type(DeviceType::Gpu).build();
    assert!(matches!(result, Err(BaggingError::NotImplemented { .. })));
}

#[test]
fn test_summary_reflects_state() {
    let (inputs, targets) = create_test_data_regression(16, 1);
    let train = DataLoader::new(inputs, targets, 8).unwrap();
    let mut ensemble =
        BaggingRegressor::new(test_config(2, 1, 1), |i| Linear::with_seed(2, 1, i as u64)).unwrap();
    assert!(ensemble.summary().contains("uninitialized"));

    ensemble.fit_with_reporter(&train, &mut RecordingReporter::new()).unwrap();
    assert!(ensemble.summary().contains("state:         trained"));
    ensemble.predict_with_reporter(&train, &mut RecordingReporter::new()).unwrap();
    assert!(ensemble.to_string().contains("evaluating"));
}
