mod common;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use skinsync_gateway::{ModelKind, PredictionService};

use common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bundles_never_mix_generations_during_reloads() {
    let registry = registry(full_store()).await;
    let done = Arc::new(AtomicBool::new(false));

    let reloader = {
        let registry = registry.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let mut reloads = 0u32;
            while !done.load(Ordering::Relaxed) {
                registry.reload().await;
                reloads += 1;
                tokio::task::yield_now().await;
            }
            reloads
        })
    };

    let mut checked = 0usize;
    for _ in 0..300 {
        let generation = registry.snapshot();
        for model in ModelKind::ALL {
            let bundle = generation.bundle(model).unwrap();
            assert_eq!(bundle.generation, generation.id());
            assert_eq!(bundle.sources.len(), model.required_keys().len());
            for (key, source) in &bundle.sources {
                assert_eq!(*source, bundle.generation, "{key} from another generation");
            }
            checked += 1;
        }
        tokio::task::yield_now().await;
    }

    done.store(true, Ordering::Relaxed);
    let reloads = reloader.await.unwrap();
    assert!(reloads > 0);
    assert_eq!(checked, 300 * ModelKind::ALL.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn predictions_stay_stable_while_reloading() {
    let registry = registry(full_store()).await;
    let service = PredictionService::new(registry.clone());

    let reloader = {
        let registry = registry.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                registry.reload().await;
                tokio::task::yield_now().await;
            }
        })
    };

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                let hydration = service.predict_hydration(&hydration_request()).await.unwrap();
                assert_eq!(hydration.predicted_hydration_level, 3.2);

                let allergen = service.detect_allergen_risk(&allergen_request()).await.unwrap();
                assert_eq!(allergen.risk_probability, 80.0);

                let suitability = service
                    .classify_suitability(&suitability_request())
                    .await
                    .unwrap();
                assert!(!suitability.is_suitable);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
    reloader.await.unwrap();
    assert!(registry.snapshot().id() > 50);
}
