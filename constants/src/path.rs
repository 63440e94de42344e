/// Dataset location relative to the asset root.
pub const DATASET_PATH: &str = "data/nodes.json";
