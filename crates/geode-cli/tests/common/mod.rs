use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

/// A temporary dataset directory plus an isolated HOME.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// 25 minerals, 3 localities, no articles or photos.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::create_dir_all(dir.path().join("home")).unwrap();

        let names = [
            "Albite", "Beryl", "Calcite", "Diamond", "Epidote", "Fluorite", "Galena", "Garnet",
            "Gypsum", "Halite", "Ilmenite", "Jadeite", "Kyanite", "Lazurite", "Magnetite",
            "Nepheline", "Olivine", "Pyrite", "Quartz", "Rutile", "Spinel", "Talc", "Topaz",
            "Uraninite", "Zircon",
        ];
        let minerals: Vec<Value> = names
            .iter()
            .enumerate()
            .rev()
            .map(|(i, name)| json!({ "id": i + 1, "name": name, "hardness": (i % 10) as f64 }))
            .collect();
        write_json(&dir.path().join("data/minerals.json"), &Value::Array(minerals));

        let localities = json!([
            {
                "id": 1, "name": "Tsumeb", "country": "Namibia",
                "latitude": -19.25, "longitude": 17.71
            },
            {
                "id": 2, "name": "Franklin", "country": "USA",
                "latitude": 41.12, "longitude": -74.58
            },
            {
                "id": 3, "name": "Sterling Hill", "country": "USA",
                "latitude": 41.08, "longitude": -74.60
            },
        ]);
        write_json(&dir.path().join("data/localities.json"), &localities);

        Self { dir }
    }

    pub fn api(&self) -> String {
        Url::from_directory_path(self.dir.path().join("data"))
            .expect("Failed to convert path to file URL")
            .to_string()
    }

    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Run the CLI with an isolated HOME and no ambient GEODE_* variables.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to execute CLI")
    }

    /// Run the CLI and expect success, returning stdout.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run the CLI feeding `input` on stdin.
    pub fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to execute CLI");
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().expect("Failed to wait for CLI")
    }

    fn command(&self, args: &[&str]) -> Command {
        let home = self.home();
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_geode"));
        cmd.args(args);
        cmd.env("HOME", &home);
        cmd.env("XDG_CONFIG_HOME", home.join("config"));
        cmd.env_remove("GEODE_API");
        cmd.env_remove("GEODE_PROXY");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Parse JSON-lines output into the `name` of each record.
pub fn names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let record: Value = serde_json::from_str(line).unwrap();
            record["name"].as_str().unwrap().to_string()
        })
        .collect()
}
