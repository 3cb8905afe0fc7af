//! Regression forest loaded from a JSON artifact
//!
//! Each tree maps an encoded feature vector to a leaf holding the three
//! target temperatures; the forest prediction is the mean over all trees.
//! Text columns are ordinally encoded with the category lists stored in the
//! artifact.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::TemperatureModel;
use crate::PredictorError;
use crate::features::{FeatureRecord, FeatureSchema};
use crate::models::TemperaturePrediction;

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    name: String,
    schema: FeatureSchema,
    features: Vec<String>,
    #[serde(default)]
    categories: HashMap<String, Vec<String>>,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 3],
    },
}

/// Multi-output regression forest
#[derive(Debug, Clone)]
pub struct ForestModel {
    name: String,
    schema: FeatureSchema,
    features: Vec<String>,
    categories: HashMap<String, Vec<String>>,
    trees: Vec<Tree>,
}

impl ForestModel {
    /// Read and validate an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| PredictorError::model_artifact(path, e.to_string()))?;
        let model = Self::parse(&raw).map_err(|message| PredictorError::model_artifact(path, message))?;

        info!(
            path = %path.display(),
            name = %model.name,
            schema = %model.schema,
            trees = model.trees.len(),
            "Loaded model artifact"
        );
        Ok(model)
    }

    fn parse(raw: &str) -> Result<Self, String> {
        let artifact: ForestArtifact =
            serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ForestArtifact) -> Result<Self, String> {
        let schema = artifact.schema;

        let declared: HashSet<&str> = artifact.features.iter().map(String::as_str).collect();
        if declared.len() != artifact.features.len() {
            return Err("duplicate feature names".to_string());
        }
        let expected: HashSet<&str> = schema.features().iter().copied().collect();
        if declared != expected {
            let mut missing: Vec<_> = expected.difference(&declared).copied().collect();
            let mut extra: Vec<_> = declared.difference(&expected).copied().collect();
            missing.sort_unstable();
            extra.sort_unstable();
            return Err(format!(
                "features do not match schema '{schema}': missing [{}], unexpected [{}]",
                missing.join(", "),
                extra.join(", ")
            ));
        }

        for feature in &artifact.features {
            let categorical = schema.is_categorical(feature);
            match artifact.categories.get(feature) {
                Some(levels) if categorical && levels.is_empty() => {
                    return Err(format!("categorical feature '{feature}' has no categories"));
                }
                Some(_) if !categorical => {
                    return Err(format!("numeric feature '{feature}' has categories"));
                }
                None if categorical => {
                    return Err(format!("categorical feature '{feature}' has no categories"));
                }
                _ => {}
            }
        }

        if artifact.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (index, tree) in artifact.trees.iter().enumerate() {
            validate_tree(tree, artifact.features.len())
                .map_err(|message| format!("tree {index}: {message}"))?;
        }

        Ok(Self {
            name: artifact.name,
            schema,
            features: artifact.features,
            categories: artifact.categories,
            trees: artifact.trees,
        })
    }

    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Encode a record into the feature vector the trees index into
    fn encode(&self, record: &FeatureRecord) -> crate::Result<Vec<f64>> {
        let names: Vec<&str> = self.features.iter().map(String::as_str).collect();
        record.ensure_columns(&names)?;

        self.features
            .iter()
            .map(|name| {
                let value = record
                    .get(name)
                    .ok_or_else(|| PredictorError::schema_mismatch(format!("missing column {name}")))?;
                match self.categories.get(name) {
                    Some(levels) => {
                        let text = value.as_text().ok_or_else(|| {
                            PredictorError::schema_mismatch(format!("column {name} must be text"))
                        })?;
                        levels
                            .iter()
                            .position(|level| level == text)
                            .map(|position| position as f64)
                            .ok_or_else(|| {
                                PredictorError::inference(format!(
                                    "unknown {name} category '{text}'"
                                ))
                            })
                    }
                    None => value.as_f64().ok_or_else(|| {
                        PredictorError::schema_mismatch(format!("column {name} must be numeric"))
                    }),
                }
            })
            .collect()
    }
}

fn validate_tree(tree: &Tree, feature_count: usize) -> Result<(), String> {
    if tree.nodes.is_empty() {
        return Err("no nodes".to_string());
    }
    for (index, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= feature_count {
                    return Err(format!("node {index} splits on unknown feature {feature}"));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {index} has a non-finite threshold"));
                }
                if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                    return Err(format!("node {index} points outside the tree"));
                }
            }
            Node::Leaf { value } => {
                if value.iter().any(|v| !v.is_finite()) {
                    return Err(format!("leaf {index} holds a non-finite value"));
                }
            }
        }
    }
    Ok(())
}

impl Tree {
    fn evaluate(&self, x: &[f64]) -> crate::Result<[f64; 3]> {
        let mut index = 0;
        // A path longer than the node count can only be a cycle.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x.get(*feature).copied().ok_or_else(|| {
                        PredictorError::inference(format!("feature index {feature} out of range"))
                    })?;
                    index = if v <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(PredictorError::inference(format!(
                        "node index {index} out of range"
                    )));
                }
            }
        }
        Err(PredictorError::inference("tree traversal did not reach a leaf"))
    }
}

impl TemperatureModel for ForestModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> FeatureSchema {
        self.schema
    }

    fn predict(&self, rows: &[FeatureRecord]) -> crate::Result<Vec<TemperaturePrediction>> {
        rows.iter()
            .map(|record| {
                let x = self.encode(record)?;
                let mut sum = [0.0_f64; 3];
                for tree in &self.trees {
                    let leaf = tree.evaluate(&x)?;
                    for (acc, v) in sum.iter_mut().zip(leaf) {
                        *acc += v;
                    }
                }
                let n = self.trees.len() as f64;
                let prediction = TemperaturePrediction::from(sum.map(|s| s / n));
                debug!(?prediction, "Forest prediction");
                Ok(prediction)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{WeatherInput, assemble};
    use crate::models::City;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_ARTIFACT: &str = r#"{
        "name": "basic-test",
        "schema": "basic",
        "features": ["city", "year", "month", "day", "humidity", "dew_point", "pressure", "wspd"],
        "categories": {"city": ["Islamabad", "Lahore", "Quetta"]},
        "trees": [
            {"nodes": [
                {"kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                {"kind": "leaf", "value": [10.0, 20.0, 15.0]},
                {"kind": "leaf", "value": [20.0, 30.0, 25.0]}
            ]},
            {"nodes": [
                {"kind": "split", "feature": 2, "threshold": 6.5, "left": 1, "right": 2},
                {"kind": "leaf", "value": [12.0, 22.0, 17.0]},
                {"kind": "leaf", "value": [0.0, 0.0, 0.0]}
            ]}
        ]
    }"#;

    fn basic_record(city: City, month: u32) -> FeatureRecord {
        let mut input = WeatherInput::defaults(FeatureSchema::Basic);
        input.city = city;
        input.month = month;
        assemble(FeatureSchema::Basic, &input).unwrap()
    }

    #[test]
    fn test_mean_of_tree_leaves() {
        let model = ForestModel::parse(BASIC_ARTIFACT).unwrap();
        assert_eq!(model.tree_count(), 2);
        assert_eq!(model.schema(), FeatureSchema::Basic);

        let out = model.predict(&[basic_record(City::Islamabad, 6)]).unwrap();
        assert_eq!(out, vec![TemperaturePrediction::new(11.0, 21.0, 16.0)]);

        let out = model.predict(&[basic_record(City::Lahore, 12)]).unwrap();
        assert_eq!(out, vec![TemperaturePrediction::new(10.0, 15.0, 12.5)]);
    }

    #[test]
    fn test_one_prediction_per_row() {
        let model = ForestModel::parse(BASIC_ARTIFACT).unwrap();
        let rows = [basic_record(City::Islamabad, 1), basic_record(City::Quetta, 9)];
        assert_eq!(model.predict(&rows).unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_record_with_wrong_schema() {
        let model = ForestModel::parse(BASIC_ARTIFACT).unwrap();
        let input = WeatherInput::defaults(FeatureSchema::GeoSeason);
        let record = assemble(FeatureSchema::GeoSeason, &input).unwrap();
        let err = model.predict(&[record]).unwrap_err();
        assert!(matches!(err, PredictorError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("unexpected columns"));
    }

    #[test]
    fn test_unknown_category_fails() {
        let model = ForestModel::parse(BASIC_ARTIFACT).unwrap();
        let mut record = basic_record(City::Lahore, 6);
        record.insert("city", "Karachi");
        let err = model.predict(&[record]).unwrap_err();
        assert!(matches!(err, PredictorError::Inference { .. }));
    }

    #[test]
    fn test_artifact_features_must_match_schema() {
        let raw = BASIC_ARTIFACT.replace("\"schema\": \"basic\"", "\"schema\": \"geo_season\"");
        let err = ForestModel::parse(&raw).unwrap_err();
        assert!(err.contains("features do not match schema 'geo_season'"), "{err}");
        assert!(err.contains("cloud_cover"));
    }

    #[test]
    fn test_rejects_dangling_node() {
        let raw = BASIC_ARTIFACT.replace("\"left\": 1, \"right\": 2}", "\"left\": 1, \"right\": 9}");
        let err = ForestModel::parse(&raw).unwrap_err();
        assert!(err.contains("points outside the tree"), "{err}");
    }

    #[test]
    fn test_cycle_is_an_inference_error() {
        let tree = Tree {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(tree.evaluate(&[0.0]).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ForestModel::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, PredictorError::ModelArtifact { .. }));
        assert!(err.is_startup_failure());
        assert!(err.to_string().contains("does/not/exist.json"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(BASIC_ARTIFACT.as_bytes()).unwrap();
        let model = ForestModel::load(file.path()).unwrap();
        assert_eq!(model.name(), "basic-test");
    }

    #[test]
    fn test_load_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\x80not json").unwrap();
        let err = ForestModel::load(file.path()).unwrap_err();
        assert!(matches!(err, PredictorError::ModelArtifact { .. }));
    }

    #[test]
    fn test_shipped_artifact() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/temperature_predictor_v3.json");
        let model = ForestModel::load(path).unwrap();
        assert_eq!(model.schema(), FeatureSchema::GeoSeason);

        let mut input = WeatherInput::defaults(FeatureSchema::GeoSeason);
        input.city = City::Lahore;
        let record = assemble(FeatureSchema::GeoSeason, &input).unwrap();
        let out = model.predict(&[record]).unwrap();
        let metrics = out[0].metrics();
        assert_eq!(metrics[0].value, "23.33 °C");
        assert_eq!(metrics[1].value, "36.67 °C");
        assert_eq!(metrics[2].value, "30.00 °C");
    }
}
