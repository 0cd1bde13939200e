//! End-to-end: train vocabularies, persist them, and encode regions.

use codeword::hierarchy::validate_tree;
use codeword::quantize::gaussian_kernel;
use codeword::{
    hierarchical_kmeans, l1_normalize, Codebook, HardAssignment, Kmeans, Quantization,
    QuantizationKind, Quantizer, SoftAssignment, TreeConfig, Vocabulary, VocabularyTree,
    VocabularyTreeQuantization,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

fn init_test_subscriber() -> tracing::subscriber::DefaultGuard {
    let fmt_layer = fmt::layer().with_target(true).with_test_writer();

    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .set_default()
}

/// Descriptors scattered around four well separated centers.
fn descriptors(rng: &mut StdRng, per_center: usize) -> Vec<Vec<f64>> {
    let centers = [[0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [0.0, 50.0, 0.0], [0.0, 0.0, 50.0]];
    centers
        .iter()
        .flat_map(|c| {
            (0..per_center)
                .map(|_| c.iter().map(|&x| x + rng.random_range(-1.0..1.0)).collect())
                .collect::<Vec<Vec<f64>>>()
        })
        .collect()
}

#[test]
fn flat_codebook_pipeline() {
    let _guard = init_test_subscriber();
    let mut rng = StdRng::seed_from_u64(2024);
    let corpus = descriptors(&mut rng, 25);

    let kmeans = Kmeans::new(4).with_trials(20);
    let codebook = Codebook::train(&corpus, &kmeans, &mut rng).unwrap();
    assert_eq!(codebook.len(), 4);
    assert_eq!(codebook.dim(), 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codebook.txt");
    codebook.save(&path).unwrap();
    let loaded = Codebook::load(&path).unwrap();
    assert_eq!(loaded, codebook);

    // Every center keeps its 25 descriptors together.
    let hard = HardAssignment::new(loaded.clone());
    let mut counts = hard.quantize(&corpus).unwrap();
    counts.sort_by(f64::total_cmp);
    assert_eq!(counts, vec![25.0; 4]);

    let soft = SoftAssignment::new(loaded, 5.0).unwrap();
    let mut weights = soft.quantize(&corpus).unwrap();
    assert!((weights.iter().sum::<f64>() - 100.0).abs() < 1e-6);
    l1_normalize(&mut weights);
    for w in weights {
        assert!((w - 0.25).abs() < 0.01);
    }
}

#[test]
fn vocabulary_tree_pipeline() {
    let _guard = init_test_subscriber();
    let mut rng = StdRng::seed_from_u64(77);
    let corpus = descriptors(&mut rng, 30);

    let config = TreeConfig::new(2, 3).with_trials(3);
    let tree = hierarchical_kmeans(&corpus, &config, &mut rng).unwrap();
    assert_eq!(tree.leaf_count(), 8);
    assert!(validate_tree(&tree).is_healthy());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.txt");
    tree.save(&path).unwrap();
    let loaded = VocabularyTree::load(&path).unwrap();
    assert_eq!(loaded, tree);

    let quant = VocabularyTreeQuantization::new(loaded.clone());
    let histogram = quant.quantize(&corpus).unwrap();
    assert_eq!(histogram.len(), 8);
    assert_eq!(histogram.iter().sum::<f64>(), corpus.len() as f64);

    // Flattened leaves keep the tree's leaf ids.
    let flat = loaded.flatten().unwrap();
    assert_eq!(flat.len(), 8);
    for (path, leaf) in loaded.leaves() {
        assert_eq!(flat.codeword(loaded.leaf_position(&path)), leaf.value());
    }
}

#[test]
fn strategies_by_name() {
    let mut rng = StdRng::seed_from_u64(5);
    let corpus = descriptors(&mut rng, 10);
    let tree = hierarchical_kmeans(&corpus, &TreeConfig::new(2, 2), &mut rng).unwrap();
    let regions = descriptors(&mut rng, 3);

    for name in ["hard", "soft", "tree"] {
        let kind: QuantizationKind = name.parse().unwrap();
        let quant = Quantization::build(kind, Vocabulary::Tree(tree.clone())).unwrap();
        assert_eq!(quant.kind(), kind);
        assert_eq!(quant.size(), 4);
        let h = quant.quantize(&regions).unwrap();
        assert_eq!(h.len(), 4);
        assert!((h.iter().sum::<f64>() - regions.len() as f64).abs() < 1e-9);
    }
}

#[test]
fn soft_weights_follow_the_kernel() {
    let codebook = Codebook::from_rows(&[vec![0.0], vec![4.0]]).unwrap();
    let soft = SoftAssignment::new(codebook, 2.0).unwrap();
    let h = soft.quantize(&[vec![1.0]]).unwrap();

    let (a, b) = (gaussian_kernel(2.0, 1.0), gaussian_kernel(2.0, 3.0));
    assert!((h[0] - a / (a + b)).abs() < 1e-12);
    assert!((h[1] - b / (a + b)).abs() < 1e-12);
}

#[test]
fn codebook_from_fit_matches_trained_codebook() {
    let mut rng = StdRng::seed_from_u64(11);
    let corpus = descriptors(&mut rng, 8);
    let kmeans = Kmeans::new(4).with_seed(3).with_trials(4);

    let fit = kmeans.fit(&corpus).unwrap();
    let from_fit = Codebook::from_rows(&fit.centroid_vecs()).unwrap();
    let trained = Codebook::train(&corpus, &kmeans, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(from_fit, trained);
}
