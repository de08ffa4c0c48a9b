use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::ProbeArgs;
use crate::error::InputRole;
use crate::model::ProbeSourceItem;
use crate::scoring::normalize;
use crate::util::read_json;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProbeRequest {
    pub scene_ids: Vec<String>,
    pub instructions: Vec<String>,
}

impl ProbeRequest {
    pub fn len(&self) -> usize {
        self.scene_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene_ids.is_empty()
    }
}

pub fn run(args: ProbeArgs) -> Result<()> {
    let json_path = absolute(&args.json_file)?;
    info!(path = %json_path.display(), "reading probe questions");

    let items: Vec<ProbeSourceItem> = read_json(&json_path, InputRole::GroundTruth)?;
    let request = build_request(&items);
    if request.is_empty() {
        bail!("no valid probe items found in {}", json_path.display());
    }

    let launcher_dir = absolute(&args.launcher_dir)?;
    if !launcher_dir.is_dir() {
        bail!("launcher directory not found: {}", launcher_dir.display());
    }

    let checkpoint = match &args.checkpoint {
        Some(path) => absolute(path)?,
        None => launcher_dir.join(&args.model_name),
    };
    let note = eval_note(&args.json_file);
    let launch_args = launcher_arguments(&args, &checkpoint, &note, &request);

    info!(
        items = request.len(),
        model = %args.model_name,
        note = %note,
        cwd = %launcher_dir.display(),
        "launching inference"
    );

    if args.dry_run {
        info!(
            command = %format!("{} {}", args.python, launch_args.join(" ")),
            "dry-run: inference not started"
        );
        return Ok(());
    }

    let status = Command::new(&args.python)
        .args(&launch_args)
        .current_dir(&launcher_dir)
        .env("HYDRA_FULL_ERROR", "1")
        .status()
        .with_context(|| format!("failed to execute {}", args.python))?;

    if !status.success() {
        bail!("inference launcher returned non-zero exit status: {status}");
    }

    info!("inference completed");
    Ok(())
}

pub fn build_request(items: &[ProbeSourceItem]) -> ProbeRequest {
    let mut request = ProbeRequest::default();
    for item in items {
        let (Some(scene_id), Some(turns)) = (&item.scene_id, &item.conversations) else {
            continue;
        };
        let Some(first_turn) = turns.first() else {
            continue;
        };
        request.scene_ids.push(scene_id.clone());
        request
            .instructions
            .push(normalize::ground_truth_question(&first_turn.value));
    }
    request
}

pub fn hydra_list(items: &[String]) -> String {
    let quoted = items
        .iter()
        .map(|item| format!("\"{}\"", item.replace('"', "\\\"")))
        .collect::<Vec<_>>();
    format!("[{}]", quoted.join(","))
}

fn eval_note(json_file: &Path) -> String {
    json_file
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.replace(".json", ""))
        .unwrap_or_default()
}

fn launcher_arguments(
    args: &ProbeArgs,
    checkpoint: &Path,
    note: &str,
    request: &ProbeRequest,
) -> Vec<String> {
    vec![
        "launch.py".to_string(),
        "--mode".to_string(),
        "python".to_string(),
        "--run_file".to_string(),
        "inference.py".to_string(),
        "--config".to_string(),
        "configs/default.yaml".to_string(),
        format!("name=leo-{}", args.model_name),
        format!("note={note}"),
        format!("pretrained_ckpt_path={}", checkpoint.display()),
        "data.scan_family_base=../".to_string(),
        "base_dir=../eval_results/".to_string(),
        format!("llm.cfg_path={}", args.llm_config),
        format!("vision3d.backbone.path={}", args.backbone_path),
        "probe.sources=[\"scannet\"]".to_string(),
        format!("probe.scene_ids={}", hydra_list(&request.scene_ids)),
        format!("probe.instructions={}", hydra_list(&request.instructions)),
        "probe.save_obj_tokens=false".to_string(),
        "dataloader.eval.batchsize=1".to_string(),
    ]
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("failed to resolve absolute path: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn probe_args() -> ProbeArgs {
        ProbeArgs {
            json_file: PathBuf::from("scannet_scannet200/random_template_1.json"),
            launcher_dir: PathBuf::from("embodied-generalist"),
            model_name: "sft_noact".to_string(),
            checkpoint: None,
            python: "python".to_string(),
            llm_config: "lmsys/vicuna-7b-v1.1".to_string(),
            backbone_path: "./pointnetpp_vil3dref.pth".to_string(),
            dry_run: true,
        }
    }

    #[test]
    fn build_request_normalizes_instructions_and_skips_incomplete_rows() {
        let items: Vec<ProbeSourceItem> = serde_json::from_value(json!([
            {
                "scene_id": "scene0000_00",
                "conversations": [{ "from": "human", "value": "Is there a chair?\n<image>" }]
            },
            { "scene_id": "scene0001_00" },
            { "conversations": [{ "value": "orphan" }] },
            { "scene_id": "scene0002_00", "conversations": [] },
            {
                "scene_id": "scene0003_00",
                "conversations": [{ "value": "<image>Is there a lamp?" }]
            }
        ]))
        .expect("probe items");

        let request = build_request(&items);
        assert_eq!(request.scene_ids, vec!["scene0000_00", "scene0003_00"]);
        assert_eq!(
            request.instructions,
            vec!["Is there a chair?", "Is there a lamp?"]
        );
    }

    #[test]
    fn hydra_list_quotes_and_escapes_items() {
        let items = vec!["plain".to_string(), "say \"yes\"".to_string()];
        assert_eq!(hydra_list(&items), r#"["plain","say \"yes\""]"#);
        assert_eq!(hydra_list(&[]), "[]");
    }

    #[test]
    fn launcher_arguments_carry_model_note_and_probe_lists() {
        let request = ProbeRequest {
            scene_ids: vec!["s1".to_string()],
            instructions: vec!["is there a chair".to_string()],
        };
        let args = probe_args();
        let note = eval_note(&args.json_file);
        assert_eq!(note, "random_template_1");

        let launch = launcher_arguments(
            &args,
            Path::new("/work/embodied-generalist/sft_noact"),
            &note,
            &request,
        );
        assert_eq!(launch[0], "launch.py");
        assert!(launch.contains(&"name=leo-sft_noact".to_string()));
        assert!(launch.contains(&"note=random_template_1".to_string()));
        assert!(launch.contains(
            &"pretrained_ckpt_path=/work/embodied-generalist/sft_noact".to_string()
        ));
        assert!(launch.contains(&"probe.scene_ids=[\"s1\"]".to_string()));
        assert!(launch.contains(&"probe.instructions=[\"is there a chair\"]".to_string()));
    }

    #[test]
    fn run_fails_without_probe_items() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json_file = dir.path().join("empty.json");
        std::fs::write(&json_file, "[]").expect("write");

        let mut args = probe_args();
        args.json_file = json_file;
        args.launcher_dir = dir.path().to_path_buf();

        let err = run(args).expect_err("empty input should fail");
        assert!(err.to_string().contains("no valid probe items"));
    }
}
