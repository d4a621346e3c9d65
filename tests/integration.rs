//! Integration tests for SegmentForge

use ndarray::array;
use segmentforge::{
    average_min_distance, evaluate, fit_kmeans, join, load_model, read_offers, read_transactions,
    save_model, sweep_cluster_counts, Error, KMeansConfig, ModelArtifact, PcaModel, PivotTable,
};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// Create a test offers CSV with six offers
fn create_offers_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "OfferId,Campaign,Varietal,Minimum,Discount,Origin,LastPeak").unwrap();
    writeln!(file, "1,January,Malbec,72,56,France,FALSE").unwrap();
    writeln!(file, "2,January,Pinot Noir,72,17,France,FALSE").unwrap();
    writeln!(file, "3,February,Espumante,144,32,Oregon,TRUE").unwrap();
    writeln!(file, "4,February,Champagne,72,48,France,TRUE").unwrap();
    writeln!(file, "5,February,Cabernet Sauvignon,144,44,New Zealand,TRUE").unwrap();
    writeln!(file, "6,March,Prosecco,144,86,Chile,FALSE").unwrap();
    file
}

/// Create a test transactions CSV with six customers and distinct
/// redemption profiles
fn create_transactions_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "LastName,OfferId").unwrap();
    writeln!(file, "Smith,1").unwrap();
    writeln!(file, "Smith,1").unwrap();
    writeln!(file, "Smith,2").unwrap();
    writeln!(file, "Johnson,2").unwrap();
    writeln!(file, "Williams,3").unwrap();
    writeln!(file, "Williams,4").unwrap();
    writeln!(file, "Brown,4").unwrap();
    writeln!(file, "Brown,4").unwrap();
    writeln!(file, "Brown,4").unwrap();
    writeln!(file, "Jones,5").unwrap();
    writeln!(file, "Garcia,1").unwrap();
    writeln!(file, "Garcia,5").unwrap();
    writeln!(file, "Garcia,6").unwrap();
    file
}

fn load_test_pivot() -> PivotTable {
    let offers_file = create_offers_csv();
    let transactions_file = create_transactions_csv();

    let offers = read_offers(offers_file.path()).unwrap();
    let transactions = read_transactions(transactions_file.path()).unwrap();
    let joined = join(&offers, &transactions).unwrap();
    PivotTable::from_records(&joined)
}

#[test]
fn test_end_to_end_pipeline() {
    let pivot = load_test_pivot();

    // Six customers, six offer columns
    assert_eq!(pivot.len(), 6);
    assert_eq!(pivot.dimension(), 6);
    assert_eq!(pivot.offer_ids, vec![1, 2, 3, 4, 5, 6]);

    // Fit the 2-D projection and the clusterer
    let pca = PcaModel::fit(&pivot.counts, 2, 42).unwrap();
    let projected = pca.project(&pivot.counts).unwrap();
    assert_eq!(projected.len(), 6);

    let config = KMeansConfig::new(3).with_seed(42);
    let model = fit_kmeans(&pivot.counts, &config).unwrap();

    assert_eq!(model.k, 3);
    assert_eq!(model.labels.len(), 6);
    assert_eq!(model.centroids.shape(), &[3, 6]);
    for &label in &model.labels {
        assert!(label < 3);
    }
    let sizes = model.cluster_sizes();
    assert_eq!(sizes.iter().sum::<usize>(), 6);

    // Metrics are well-defined and non-negative
    let metrics = evaluate(&model, &pivot.counts).unwrap();
    assert!(metrics.avg_min_distance >= 0.0);
    assert!(metrics.davies_bouldin >= 0.0);

    // Persist and restore the trained pipeline state
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("model.json");
    let artifact = ModelArtifact {
        offer_ids: pivot.offer_ids.clone(),
        pca,
        kmeans: model,
    };
    save_model(&artifact, &model_path).unwrap();
    let restored = load_model(&model_path).unwrap();

    assert_eq!(restored.offer_ids, pivot.offer_ids);
    for (i, row) in pivot.counts.outer_iter().enumerate() {
        let before = artifact.kmeans.predict(row).unwrap();
        let after = restored.kmeans.predict(row).unwrap();
        assert_eq!(before.cluster, after.cluster);
        assert_eq!(before.cluster, artifact.kmeans.labels[i]);
    }
}

#[test]
fn test_pivot_row_sums_equal_transaction_counts() {
    let pivot = load_test_pivot();

    // Customers come out sorted by key
    assert_eq!(
        pivot.customers,
        vec!["Brown", "Garcia", "Johnson", "Jones", "Smith", "Williams"]
    );

    let expected_counts = [3.0, 3.0, 1.0, 1.0, 3.0, 2.0];
    for (i, &expected) in expected_counts.iter().enumerate() {
        let row_sum: f64 = pivot.counts.row(i).sum();
        assert_eq!(row_sum, expected, "row sum for {}", pivot.customers[i]);
    }
}

#[test]
fn test_unknown_offer_reference_aborts_preprocessing() {
    let offers_file = create_offers_csv();
    let mut transactions_file = NamedTempFile::new().unwrap();
    writeln!(transactions_file, "LastName,OfferId").unwrap();
    writeln!(transactions_file, "Smith,1").unwrap();
    writeln!(transactions_file, "Johnson,9").unwrap();

    let offers = read_offers(offers_file.path()).unwrap();
    let transactions = read_transactions(transactions_file.path()).unwrap();

    let result = join(&offers, &transactions);
    match result {
        Err(Error::UnknownOfferReference {
            offer_id,
            last_name,
        }) => {
            assert_eq!(offer_id, 9);
            assert_eq!(last_name, "Johnson");
        }
        other => panic!("expected UnknownOfferReference, got {other:?}"),
    }
}

#[test]
fn test_malformed_transactions_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "LastName,OfferId").unwrap();
    writeln!(file, "Smith,1").unwrap();
    writeln!(file, "Johnson,abc").unwrap();

    let result = read_transactions(file.path());
    assert!(matches!(result, Err(Error::MalformedRow { .. })));
}

#[test]
fn test_error_handling_invalid_clusters() {
    let pivot = load_test_pivot();

    // k = 0
    let result = fit_kmeans(&pivot.counts, &KMeansConfig::new(0));
    assert!(matches!(
        result,
        Err(Error::InvalidClusterCount { requested: 0, .. })
    ));

    // k greater than the number of distinct customers
    let result = fit_kmeans(&pivot.counts, &KMeansConfig::new(100));
    assert!(matches!(
        result,
        Err(Error::InvalidClusterCount {
            requested: 100,
            distinct: 6
        })
    ));
}

#[test]
fn test_two_customer_scenario() {
    // Offers O1, O2; Alice redeems O1 twice and O2 once, Bob redeems O2.
    let mut offers_file = NamedTempFile::new().unwrap();
    writeln!(offers_file, "OfferId,Campaign,Varietal,Minimum,Discount,Origin,LastPeak").unwrap();
    writeln!(offers_file, "1,January,Malbec,72,56,France,FALSE").unwrap();
    writeln!(offers_file, "2,January,Pinot Noir,72,17,France,FALSE").unwrap();

    let mut transactions_file = NamedTempFile::new().unwrap();
    writeln!(transactions_file, "LastName,OfferId").unwrap();
    writeln!(transactions_file, "Alice,1").unwrap();
    writeln!(transactions_file, "Alice,1").unwrap();
    writeln!(transactions_file, "Alice,2").unwrap();
    writeln!(transactions_file, "Bob,2").unwrap();

    let offers = read_offers(offers_file.path()).unwrap();
    let transactions = read_transactions(transactions_file.path()).unwrap();
    let joined = join(&offers, &transactions).unwrap();
    let pivot = PivotTable::from_records(&joined);

    assert_eq!(pivot.customers, vec!["Alice", "Bob"]);
    assert_eq!(pivot.counts, array![[2.0, 1.0], [0.0, 1.0]]);

    // Two maximally-separated points: any seed must split them, and each
    // point coincides with its own centroid.
    for seed in [0u64, 1, 7, 42, 9999] {
        let model = fit_kmeans(&pivot.counts, &KMeansConfig::new(2).with_seed(seed)).unwrap();
        assert_ne!(model.labels[0], model.labels[1], "seed {seed}");

        let avg = average_min_distance(&model, &pivot.counts).unwrap();
        assert!(avg < 1e-12, "seed {seed}: avg = {avg}");
    }
}

#[test]
fn test_sweep_over_k_range() {
    let pivot = load_test_pivot();

    let results = sweep_cluster_counts(&pivot.counts, 2, 5, 100, 42).unwrap();

    // Exactly four results, ascending in k
    assert_eq!(results.len(), 4);
    let ks: Vec<usize> = results.iter().map(|r| r.k).collect();
    assert_eq!(ks, vec![2, 3, 4, 5]);
    for result in &results {
        assert!(result.loss >= 0.0);
    }
}

#[test]
fn test_sweep_aborts_beyond_distinct_count() {
    let pivot = load_test_pivot();

    let result = sweep_cluster_counts(&pivot.counts, 2, 10, 100, 42);
    assert!(matches!(
        result,
        Err(Error::InvalidClusterCount { requested: 7, .. })
    ));
}

#[test]
fn test_pivot_csv_export_shape() {
    let pivot = load_test_pivot();

    let dir = tempdir().unwrap();
    let path = dir.path().join("pivot.csv");
    pivot.save_csv(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 7); // header + six customers
    assert_eq!(lines[0], "C1,C2,C3,C4,C5,C6,LastName");
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), 7);
    }
}
