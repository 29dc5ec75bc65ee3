//! GitHub Actions workflow template

use crate::error::{ConfigError, Result};

use super::{CITemplate, TemplateOptions};

/// GitHub Actions workflow template generator
#[derive(Debug, Clone, Default)]
pub struct GitHubActionsTemplate;

/// One job per release task
struct Job {
    id: &'static str,
    name: &'static str,
    task: &'static str,
    env: &'static [(&'static str, &'static str)],
    setup: &'static str,
}

const WEBSITE_JOB: Job = Job {
    id: "website",
    name: "Update website",
    task: "website",
    env: &[("HERALD_WEBSITE_TOKEN", "${{ secrets.WEBSITE_TOKEN }}")],
    setup: "",
};

const IMAGE_JOB: Job = Job {
    id: "image",
    name: "Publish image",
    task: "image",
    env: &[
        ("HERALD_REGISTRY_USERNAME", "${{ secrets.DOCKER_USERNAME }}"),
        ("HERALD_REGISTRY_PASSWORD", "${{ secrets.DOCKER_PASSWORD }}"),
    ],
    setup: "      - name: Set up Docker Buildx\n        uses: docker/setup-buildx-action@v3\n\n",
};

const ANNOUNCE_JOB: Job = Job {
    id: "announce",
    name: "Announce release",
    task: "announce",
    env: &[
        ("HERALD_TWITTER_CONSUMER_KEY", "${{ secrets.TWITTER_CONSUMER_KEY }}"),
        ("HERALD_TWITTER_CONSUMER_SECRET", "${{ secrets.TWITTER_CONSUMER_SECRET }}"),
        ("HERALD_TWITTER_ACCESS_TOKEN", "${{ secrets.TWITTER_ACCESS_TOKEN }}"),
        (
            "HERALD_TWITTER_ACCESS_TOKEN_SECRET",
            "${{ secrets.TWITTER_ACCESS_TOKEN_SECRET }}",
        ),
    ],
    setup: "",
};

impl GitHubActionsTemplate {
    /// Create a new template
    pub fn new() -> Self {
        Self
    }

    /// Render one independent job. Jobs never declare `needs`.
    fn render_job(&self, job: &Job, options: &TemplateOptions) -> String {
        let mut out = String::new();
        out.push_str(&format!("  {}:\n", job.id));
        out.push_str(&format!("    name: {}\n", job.name));
        out.push_str(&format!("    runs-on: {}\n", options.runner));
        out.push_str("    steps:\n");
        out.push_str("      - name: Checkout\n        uses: actions/checkout@v4\n\n");
        out.push_str(job.setup);
        out.push_str(&format!(
            "      - name: Install Herald\n        run: {}\n\n",
            options.install_command
        ));
        out.push_str(&format!("      - name: {}\n", job.name));
        out.push_str(&format!(
            "        run: herald {} \"${{{{ github.ref_name }}}}\"\n",
            job.task
        ));
        out.push_str("        env:\n");
        out.push_str("          GITHUB_REPOSITORY: ${{ github.repository }}\n");
        for (key, value) in job.env {
            out.push_str(&format!("          {}: {}\n", key, value));
        }
        out
    }
}

impl CITemplate for GitHubActionsTemplate {
    fn platform_name(&self) -> &'static str {
        "GitHub Actions"
    }

    fn config_path(&self) -> &'static str {
        ".github/workflows/release.yml"
    }

    fn generate(&self, options: &TemplateOptions) -> Result<String> {
        let jobs: Vec<&Job> = [
            (options.include_website, &WEBSITE_JOB),
            (options.include_image, &IMAGE_JOB),
            (options.include_announce, &ANNOUNCE_JOB),
        ]
        .into_iter()
        .filter_map(|(enabled, job)| enabled.then_some(job))
        .collect();

        if jobs.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "workflow".to_string(),
                message: "at least one job must be enabled".to_string(),
            }
            .into());
        }

        let mut workflow = format!(
            "name: {}\n\non:\n  push:\n    tags:\n      - '{}'\n\npermissions:\n  contents: read\n\njobs:\n",
            options.workflow_name, options.tag_pattern
        );

        let rendered: Vec<String> = jobs
            .iter()
            .map(|job| self.render_job(job, options))
            .collect();
        workflow.push_str(&rendered.join("\n"));

        Ok(workflow)
    }
}
