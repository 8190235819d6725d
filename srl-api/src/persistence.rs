use crate::{builders::experiment::RunResult, error::PersistenceError, response::RunResponse};
use srl_agents::sarsa::SarsaModel;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::info;
use uuid::Uuid;

pub const MODEL_FILE: &str = "sarsa_model.bin";
pub const RESULTS_FILE: &str = "results.json";

/// `<output>/sarsa/<run_id>`
pub fn run_dir(output: &Path, run_id: Uuid) -> PathBuf {
    output.join("sarsa").join(run_id.to_string())
}

pub fn save_model(model: &SarsaModel, path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = bincode::serde::encode_to_vec(model, bincode::config::standard())?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_model(path: &Path) -> Result<SarsaModel, PersistenceError> {
    let bytes = fs::read(path)?;
    let (model, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
    Ok(model)
}

/// Writes `results.json` into `dir` as pretty printed JSON and returns its path.
pub fn write_report(response: &RunResponse, dir: &Path) -> Result<PathBuf, PersistenceError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(RESULTS_FILE);
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, response)?;
    Ok(path)
}

/// Stores the model and the report of a finished run under its own directory.
pub fn persist_run(result: &RunResult, output: &Path) -> Result<RunResponse, PersistenceError> {
    let dir = run_dir(output, result.run_id);
    let model_path = dir.join(MODEL_FILE);
    save_model(&result.model, &model_path)?;
    let response = RunResponse::success(result, Some(model_path));
    let report_path = write_report(&response, &dir)?;
    info!(run_id = %result.run_id, report = %report_path.display(), "run persisted");
    Ok(response)
}
