use policyrag_core::config::EmbeddingSettings;
use policyrag_core::traits::Embedder;
use policyrag_embed::{load_embedder, FakeEmbedder};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(384);
    let texts = vec!["hello world".to_string(), "hello world".to_string(), "other text".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    assert_eq!(embs.len(), 3);
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 384, "embedding dim is 384");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
    assert_ne!(embs[0], embs[2]);
}

#[test]
fn embed_one_matches_batch() {
    let embedder = FakeEmbedder::new(64);
    let one = embedder.embed_one("retention discount").unwrap();
    let batch = embedder.embed_batch(&["retention discount".to_string()]).unwrap();
    assert_eq!(one, batch[0]);
    assert_eq!(embedder.embedder_id(), "fake:xxh64:d64");
}

#[test]
fn settings_select_fake_embedder() {
    let settings = EmbeddingSettings { use_fake: true, fake_dim: 32, ..EmbeddingSettings::default() };
    let embedder = load_embedder(&settings, None).expect("embedder");
    assert_eq!(embedder.dim(), 32);
}

#[test]
fn missing_model_dir_is_unavailable() {
    let settings = EmbeddingSettings::default();
    let missing = std::path::Path::new("/definitely/not/a/model/dir");
    if std::env::var("APP_USE_FAKE_EMBEDDINGS").is_ok() { return; }
    let err = load_embedder(&settings, Some(missing)).err().expect("must fail");
    assert!(matches!(
        err,
        policyrag_core::Error::Collaborator { kind: policyrag_core::CollaboratorKind::Unavailable, .. }
    ));
}

#[test]
fn zero_fake_dimension_is_a_config_error() {
    let settings = EmbeddingSettings { use_fake: true, fake_dim: 0, ..EmbeddingSettings::default() };
    let err = load_embedder(&settings, None).err().expect("must fail");
    assert!(matches!(err, policyrag_core::Error::InvalidConfig(_)));
}
