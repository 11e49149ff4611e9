use anyhow::Result;
use budget_sankey::{CliConfig, EtlEngine, FlowError, FlowGraph, LocalStorage, SankeyPipeline};
use httpmock::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/budget.json");

fn config_for(dataset: String, output_path: &str) -> CliConfig {
    CliConfig {
        dataset,
        output_path: output_path.to_string(),
        output_formats: vec!["json".to_string(), "csv".to_string()],
        ..CliConfig::default()
    }
}

fn read_graph(dir: &Path, container: &str) -> Result<FlowGraph> {
    let bytes = std::fs::read(dir.join(format!("{}.json", container)))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_end_to_end_from_local_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = config_for(FIXTURE.to_string(), &output_path);
    let pipeline = SankeyPipeline::new(LocalStorage::new(output_path.clone()), config);
    let result = EtlEngine::new(pipeline).run().await?;

    assert_eq!(result, output_path);

    let student = read_graph(temp_dir.path(), "containerOne")?;
    assert_eq!(student.nodes.len(), 6);
    assert_eq!(student.links.len(), 12);

    let fee = read_graph(temp_dir.path(), "containerTwo")?;
    assert_eq!(fee.nodes.len(), 4);
    assert_eq!(fee.links.len(), 3);

    let revenues = read_graph(temp_dir.path(), "containerThree")?;
    assert_eq!(revenues.nodes.len(), 7);
    assert!(revenues
        .links
        .iter()
        .any(|l| l.target == "Investment income" && l.value == 1_800_000.0));

    let athletics = read_graph(temp_dir.path(), "containerFour")?;
    assert_eq!(athletics.nodes.len(), 9);
    assert_eq!(athletics.links.len(), 18);

    let csv = std::fs::read_to_string(temp_dir.path().join("containerTwo.csv"))?;
    assert_eq!(csv.lines().count(), 4);

    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("manifest.json"))?)?;
    let diagrams = manifest["diagrams"].as_array().unwrap();
    assert_eq!(diagrams.len(), 4);
    assert_eq!(diagrams[1]["kind"], "comprehensive-fee");
    assert_eq!(diagrams[1]["warnings"].as_array().unwrap().len(), 1);
    assert_eq!(manifest["revenue_year"], "2023");

    Ok(())
}

#[tokio::test]
async fn test_end_to_end_over_http() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let body = std::fs::read_to_string(FIXTURE)?;
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/data/jmu.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(body);
    });

    let config = config_for(server.url("/data/jmu.json"), &output_path);
    let pipeline = SankeyPipeline::new(LocalStorage::new(output_path.clone()), config);
    EtlEngine::new(pipeline).run().await?;

    api_mock.assert();
    assert!(Path::new(&output_path).join("containerFour.json").exists());
    assert!(Path::new(&output_path).join("manifest.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_builds_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/data/jmu.json");
        then.status(500);
    });

    let config = config_for(server.url("/data/jmu.json"), &output_path);
    let pipeline = SankeyPipeline::new(LocalStorage::new(output_path.clone()), config);
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    api_mock.assert();
    assert!(matches!(err, FlowError::DatasetLoad { .. }));
    assert!(!Path::new(&output_path).exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_collection_leaves_placeholder() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    let dataset_path = temp_dir.path().join("partial.json");
    std::fs::write(
        &dataset_path,
        serde_json::json!({
            "student-costs": [
                {"type": "student itemized", "name": "Housing", "semester": "Fall", "in-state": 1000}
            ]
        })
        .to_string(),
    )?;

    let config = config_for(dataset_path.to_str().unwrap().to_string(), &output_path);
    let pipeline = SankeyPipeline::new(LocalStorage::new(output_path.clone()), config);
    EtlEngine::new(pipeline).run().await?;

    let out = Path::new(&output_path);
    assert_eq!(read_graph(out, "containerOne")?.links.len(), 2);
    assert!(read_graph(out, "containerThree")?.is_empty());
    assert!(read_graph(out, "containerFour")?.is_empty());

    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join("manifest.json"))?)?;
    assert_eq!(manifest["diagrams"][0]["status"], "built");
    assert_eq!(manifest["diagrams"][1]["status"], "built");
    assert_eq!(manifest["diagrams"][2]["status"], "placeholder");
    assert_eq!(manifest["diagrams"][3]["status"], "placeholder");
    Ok(())
}

#[tokio::test]
async fn test_zip_bundle_written_to_output_dir() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = CliConfig {
        zip: true,
        ..config_for(FIXTURE.to_string(), &output_path)
    };
    let pipeline = SankeyPipeline::new(LocalStorage::new(output_path.clone()), config);
    let result = EtlEngine::new(pipeline).run().await?;

    assert!(result.ends_with("sankey_output.zip"));
    let zip_data = std::fs::read(temp_dir.path().join("sankey_output.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 9);

    let mut entry = archive.by_name("containerOne.json")?;
    let mut contents = String::new();
    std::io::Read::read_to_string(&mut entry, &mut contents)?;
    let graph: FlowGraph = serde_json::from_str(&contents)?;
    assert_eq!(graph.links.len(), 12);
    Ok(())
}
