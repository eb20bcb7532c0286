#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use exemplar_core::{
    AcceptAll, Dialect, DuplicatePolicy, Harvester, Ledger, NewRelease, RecordOutcome,
    ReleaseInfo, write_artifacts,
};
use tempfile::TempDir;

const JS_SAMPLE: &str = "\
// Copyright (c) Example Corp.
// Licensed under the MIT License.

const { WidgetsClient } = require(\"@azure/arm-widgets\");
const { DefaultAzureCredential } = require(\"@azure/identity\");

/**
 * This sample demonstrates how to get a widget.
 *
 * @summary get a widget.
 * x-ms-original-file: specification/widgets/resource-manager/stable/2024-01-01/examples/Widgets_Get.json
 */
async function getAWidget() {
  const client = new WidgetsClient(new DefaultAzureCredential(), \"sub\");
  const result = await client.widgets.get(\"rg\", \"w1\");
  console.log(result);
}

getAWidget().catch(console.error);

/**
 * This sample demonstrates how to delete a widget.
 *
 * @summary delete a widget.
 * x-ms-original-file: specification/widgets/resource-manager/stable/2024-01-01/examples/Widgets_Delete.json
 */
async function deleteAWidget() {
  const client = new WidgetsClient(new DefaultAzureCredential(), \"sub\");
  await client.widgets.beginDeleteAndWait(\"rg\", \"w1\");
}

deleteAWidget().catch(console.error);
";

fn js_release() -> ReleaseInfo {
    ReleaseInfo::new(
        Dialect::JavaScript,
        "@azure/arm-widgets_3.0.0",
        "@azure/arm-widgets",
        "3.0.0",
    )
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

#[tokio::test]
async fn two_unit_sample_produces_two_markdown_files() {
    let sources = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::create_dir_all(sources.path().join("samples-dev")).unwrap();
    fs::write(sources.path().join("samples-dev").join("widgets.js"), JS_SAMPLE).unwrap();

    let harvester = Harvester::new(Dialect::JavaScript, &js_release(), AcceptAll);
    let harvest = harvester.harvest(sources.path()).await.unwrap();
    assert_eq!(harvest.report.units_found, 2);
    assert_eq!(harvest.report.accepted, 2);

    let written = write_artifacts(&harvest.artifacts, output.path()).unwrap();
    let dir = "specification/widgets/resource-manager/stable/2024-01-01/examples-js";
    assert_eq!(
        written,
        vec![format!("{dir}/Widgets_Get.md"), format!("{dir}/Widgets_Delete.md")]
    );

    let get = read(output.path(), &written[0]);
    let delete = read(output.path(), &written[1]);

    for doc in [&get, &delete] {
        assert!(doc.starts_with(
            "Read the [SDK documentation](https://github.com/Azure/azure-sdk-for-js/blob/%40azure%2Farm-widgets_3.0.0/sdk/widgets/arm-widgets/README.md)"
        ));
        assert_eq!(doc.matches("```javascript\n").count(), 1);
        assert!(doc.ends_with("```\n"));
        assert!(doc.contains("const { WidgetsClient } = require(\"@azure/arm-widgets\");"));
        assert!(!doc.contains("Copyright"));
    }

    assert!(get.contains("getAWidget().catch(console.error);"));
    assert!(!get.contains("deleteAWidget"));
    assert!(delete.contains("deleteAWidget().catch(console.error);"));
    assert!(!delete.contains("getAWidget"));
}

#[tokio::test]
async fn harvest_then_record_is_idempotent_under_reject() {
    let sources = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    fs::write(sources.path().join("widgets.js"), JS_SAMPLE).unwrap();

    let release = js_release();
    let name = Dialect::JavaScript
        .rules()
        .default_release_name(&release.package, &release.version);
    let mut ledger = Ledger::open(state.path().join("examples.db")).unwrap();

    let harvester = Harvester::new(Dialect::JavaScript, &release, AcceptAll);
    let harvest = harvester.harvest(sources.path()).await.unwrap();
    let files = write_artifacts(&harvest.artifacts, output.path()).unwrap();

    let new_release = NewRelease {
        name: name.clone(),
        language: Dialect::JavaScript.as_str().to_string(),
        tag: release.tag.clone(),
        package: release.package.clone(),
        version: release.version.clone(),
        published_at: chrono::Utc::now(),
        files: files.clone(),
    };

    assert_eq!(
        ledger.record_release(&new_release, DuplicatePolicy::Reject).unwrap(),
        RecordOutcome::Written
    );
    assert_eq!(
        ledger.record_release(&new_release, DuplicatePolicy::Reject).unwrap(),
        RecordOutcome::Duplicate
    );

    let mut recorded = ledger.files_for_release(&name, "js").unwrap();
    let mut expected = files;
    recorded.sort();
    expected.sort();
    assert_eq!(recorded, expected);
}

#[tokio::test]
async fn java_units_become_standalone_main_classes() {
    let sources = TempDir::new().unwrap();
    let java = "\
// Copyright (c) Example Corp.

package com.example.widgets.generated;

/** Samples for Widgets Get. */
public final class WidgetsGetSamples {
    /*
     * x-ms-original-file:
     * specification/widgets/resource-manager/stable/2024-01-01/examples/
     * Widgets_Get.json
     */
    /**
     * Sample code: Get a widget.
     *
     * @param manager Entry point to WidgetsManager.
     */
    public static void getAWidget(com.example.widgets.WidgetsManager manager) {
        manager.widgets().getByResourceGroup(\"rg\", \"w1\", com.azure.core.util.Context.NONE);
    }
}
";
    fs::write(sources.path().join("WidgetsGetSamples.java"), java).unwrap();
    let release = ReleaseInfo::new(
        Dialect::Java,
        "azure-resourcemanager-widgets_1.0.0",
        "azure-resourcemanager-widgets",
        "1.0.0",
    );

    let harvest = Harvester::new(Dialect::Java, &release, AcceptAll)
        .harvest(sources.path())
        .await
        .unwrap();

    assert_eq!(harvest.artifacts.len(), 1);
    let artifact = &harvest.artifacts[0];
    assert_eq!(
        artifact.relative_path(),
        "specification/widgets/resource-manager/stable/2024-01-01/examples-java/Widgets_Get.md"
    );
    assert!(artifact.content.contains("```java\n"));
    assert!(artifact.content.contains("public final class Main {"));
    assert!(!artifact.content.contains("package com.example"));
    assert!(artifact.content.ends_with("}\n```\n"));
}
