#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use assert_cmd::Command;
use tempfile::TempDir;

pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

pub const JS_SAMPLE: &str = "\
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

/// Isolated sources, output and state directories plus a config file
/// pointing the ledger into the state directory.
pub struct Workspace {
    pub root: TempDir,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create workspace");
        for dir in ["sources", "output", "state"] {
            fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        let ledger = root.path().join("state").join("examples.db");
        let config = format!("[ledger]\npath = {:?}\n", ledger.display().to_string());
        fs::write(root.path().join("config.toml"), config).unwrap();
        Self { root }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn ledger(&self) -> PathBuf {
        self.path("state/examples.db")
    }

    pub fn write_source(&self, relative: &str, content: &str) {
        let path = self.path("sources").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// `exemplar` with this workspace's config and colors off.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("exemplar"));
        cmd.timeout(CMD_TIMEOUT);
        cmd.env("EXEMPLAR_CONFIG", self.path("config.toml"));
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// `exemplar extract` for the widgets JS release.
    pub fn extract_js(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["extract", "--dialect", "js", "--sources"])
            .arg(self.path("sources"))
            .arg("--output")
            .arg(self.path("output"))
            .args([
                "--tag",
                "@azure/arm-widgets_3.0.0",
                "--package",
                "@azure/arm-widgets",
                "--release-version",
                "3.0.0",
                "--published-at",
                "2024-03-05",
            ]);
        cmd
    }
}

#[allow(dead_code)]
pub fn read_json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).expect("stdout is JSON")
}

#[allow(dead_code)]
pub fn exists(root: &Path, relative: &str) -> bool {
    root.join(relative).is_file()
}
