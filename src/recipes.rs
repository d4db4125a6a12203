//! Step lists for the backend and frontend targets

use crate::config::Config;
use crate::orchestrator::{Step, TargetPlan};

/// Columns of the generated `Video` model
const VIDEO_ATTRIBUTES: &str =
    "title:string,originalName:string,originalPath:string,convertedPath:string,format:string,status:string";

fn npm_install(flags: &[&str], packages: &[String]) -> Step {
    let mut argv: Vec<String> = vec!["npm".into(), "install".into()];
    argv.extend(flags.iter().map(|f| f.to_string()));
    argv.extend(packages.iter().cloned());
    Step::run(argv)
}

/// Express + Sequelize API with a transcoding queue
pub fn backend(config: &Config) -> TargetPlan {
    let mut steps = vec![Step::run(["npm", "init", "-y"])];

    if !config.backend.packages.is_empty() {
        steps.push(npm_install(&[], &config.backend.packages));
    }
    if !config.backend.dev_packages.is_empty() {
        steps.push(npm_install(&["--save-dev"], &config.backend.dev_packages));
    }

    steps.extend([
        Step::run(["npx", "sequelize-cli", "init"]),
        Step::run([
            "npx",
            "sequelize-cli",
            "model:generate",
            "--name",
            "Video",
            "--attributes",
            VIDEO_ATTRIBUTES,
        ]),
        Step::directory("uploads"),
        Step::directory("converted"),
        Step::install("config", "config.json"),
        Step::install("", "server.js"),
        Step::install("", "worker.js"),
        Step::install("", "queue.js"),
        Step::install("routes", "videos.js"),
        Step::install_as("", ".gitignore", "gitignore"),
        Step::run(["npx", "sequelize-cli", "db:migrate"]),
    ]);

    TargetPlan::new(&config.general.backend_dir, steps).with_template_set("backend")
}

/// Vite + React client
pub fn frontend(config: &Config) -> TargetPlan {
    let mut steps = vec![
        Step::run(["npm", "create", "vite@latest", ".", "--", "--template", "react"]),
        Step::run(["npm", "install"]),
    ];

    if !config.frontend.packages.is_empty() {
        steps.push(npm_install(&[], &config.frontend.packages));
    }

    steps.extend([
        Step::directory("src/components"),
        Step::install("", "vite.config.js"),
        Step::install("src", "App.jsx"),
        Step::install("src/components", "VideoUpload.jsx"),
        Step::install("src/components", "VideoList.jsx"),
    ]);

    TargetPlan::new(&config.general.frontend_dir, steps).with_template_set("frontend")
}

/// Both targets, in run order
pub fn all(config: &Config) -> [TargetPlan; 2] {
    [backend(config), frontend(config)]
}
