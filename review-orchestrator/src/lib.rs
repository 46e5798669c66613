//! Review Orchestrator (C10, spec §4.9): drives the diff parser/filter/
//! chunker (C1-C3), the static-tool harness (C6), the vulnerability
//! scanner (C7), the LLM analyzer (C8), the aggregator (C9), and the risk
//! scorer (C5) for one [`ReviewJob`], then posts the result via
//! [`forge_client::ForgeClient`].
//!
//! State machine (spec §4.9): `Received -> CheckRunCreated? -> DiffFetched
//! -> Parsed -> Categorized -> ToolsRun -> CVEScanned -> ContextRetrieved
//! -> LLMRun -> Aggregated -> Posted -> (CheckRunUpdated?) -> Done`. Only
//! diff-fetch and post failures are fatal (spec §7); every other stage
//! degrades gracefully and is reflected in `stats`.

mod config;
mod errors;
mod sandbox;

pub use config::OrchestratorConfig;
pub use errors::{Error, Result};

use diff_core::{chunk_files, parse_unified_diff, DiffFilter};
use forge_client::{ForgeClient, PostReviewRequest, ReviewComment};
use llm_analyzer::{LlmProvider, RagContext};
use review_types::{Issue, ReviewEvent, ReviewJob, ReviewOutput, ReviewStats, RiskLevel};
use sandbox::Sandbox;
use tracing::{error, info, info_span, warn, Instrument};
use vuln_scan::OsvClient;

/// Outcome of running one job end to end (spec §4.9/§7). `success=false`
/// marks the job failed for the queue backend's retry policy; every other
/// degradation still reports `success=true` with reduced `stats`.
#[derive(Debug, Clone)]
pub struct ReviewResult {
    pub success: bool,
    pub output: Option<ReviewOutput>,
    pub error: Option<String>,
}

impl ReviewResult {
    fn ok(output: ReviewOutput) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
        }
    }

    fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }
}

pub struct Orchestrator {
    forge: ForgeClient,
    llm: LlmProvider,
    osv_client: Option<OsvClient>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        forge: ForgeClient,
        llm: LlmProvider,
        osv_client: Option<OsvClient>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            forge,
            llm,
            osv_client,
            config,
        }
    }

    pub async fn process(&self, job: ReviewJob) -> ReviewResult {
        let span = info_span!("review_job", job_id = %job.id, owner = %job.owner, repo = %job.repo, pr = job.pr_number);
        self.process_inner(job).instrument(span).await
    }

    async fn process_inner(&self, job: ReviewJob) -> ReviewResult {
        let started = std::time::Instant::now();
        info!(event = ?ReviewEvent::Received { job_id: job.id.clone() }, "job received");

        let check_run = self
            .forge
            .create_check_run(job.installation_id, &job.owner, &job.repo, &job.sha)
            .await;

        let pr_info = match self
            .forge
            .get_pull_request(job.installation_id, &job.owner, &job.repo, job.pr_number)
            .await
        {
            Ok(info) => info,
            Err(err) => return self.fail_job(&job, check_run.as_ref().map(|c| c.id), Error::DiffFetch(err).to_string()).await,
        };

        let diff_text = match self
            .forge
            .get_pull_request_diff(job.installation_id, &job.owner, &job.repo, job.pr_number)
            .await
        {
            Ok(text) => text,
            Err(err) => return self.fail_job(&job, check_run.as_ref().map(|c| c.id), Error::DiffFetch(err).to_string()).await,
        };
        let parsed = match parse_unified_diff(&diff_text) {
            Ok(p) => p,
            Err(err) => return self.fail_job(&job, check_run.as_ref().map(|c| c.id), Error::from(err).to_string()).await,
        };
        let files_changed = parsed.files.len() as u32;
        info!(event = ?ReviewEvent::DiffFetched { job_id: job.id.clone(), files: files_changed }, "diff fetched");

        let filter = match DiffFilter::new(&self.config.filter) {
            Ok(f) => f,
            Err(_) => DiffFilter::default_filter(),
        };
        let partitioned = filter.partition(parsed.files);
        info!(
            source = partitioned.source.len(),
            lockfiles = partitioned.lockfiles.len(),
            excluded = partitioned.excluded.len(),
            "categorized"
        );

        if partitioned.source.is_empty() && partitioned.lockfiles.is_empty() {
            let output = self.empty_output(&job, files_changed, started.elapsed());
            return self
                .post_and_finish(&job, check_run.as_ref().map(|c| c.id), &pr_info.head.sha, output, Vec::new())
                .await;
        }

        let mut issues: Vec<Issue> = Vec::new();
        let mut tools_run = Vec::new();
        let mut tools_failed = Vec::new();

        let source_paths: Vec<String> = partitioned
            .source
            .iter()
            .map(|f| f.effective_path().to_string())
            .collect();

        let sandbox = match Sandbox::populate(
            &self.forge,
            job.installation_id,
            &job.owner,
            &job.repo,
            &pr_info.head.sha,
            &source_paths,
        )
        .await
        {
            Ok(s) => Some(s),
            Err(err) => {
                warn!(%err, "failed to build static-analysis sandbox, skipping static tools");
                None
            }
        };

        if let Some(sandbox) = &sandbox {
            let mut tool_config = self.config.tool_config.clone();
            tool_config.workdir = sandbox.workdir().to_path_buf();
            let results = static_tools::run_all(&source_paths, &tool_config, self.config.tool_toggles).await;
            for result in results {
                if result.success {
                    tools_run.push(result.tool.clone());
                    issues.extend(result.issues);
                } else {
                    tools_failed.push(result.tool.clone());
                    if let Some(err) = &result.error {
                        warn!(tool = %result.tool, error = %err, "tool did not produce results");
                    }
                }
            }
        }
        info!(event = ?ReviewEvent::AnalysisFinished { job_id: job.id.clone(), source: "static-tools".into(), issues: issues.len() as u32 }, "tools run");

        if self.config.enable_osv_scan {
            if let Some(client) = &self.osv_client {
                let vuln_issues = self.scan_lockfiles(&job, &pr_info.head.sha, &partitioned.lockfiles, client).await;
                issues.extend(vuln_issues);
            }
        }
        info!(event = ?ReviewEvent::AnalysisFinished { job_id: job.id.clone(), source: "vuln-scan".into(), issues: issues.len() as u32 }, "cve scan finished");

        let context = self.fetch_rag_context(&job, &pr_info.head.sha).await;

        let chunks = chunk_files(partitioned.source, &self.config.chunk);
        info!(event = ?ReviewEvent::Chunked { job_id: job.id.clone(), chunks: chunks.len() as u32 }, "chunked");

        let pr_body = pr_info.body.clone().unwrap_or_default();
        // LLM chunks run sequentially within a job to respect provider rate
        // limits (spec §5); static tools and the vuln scan above already ran
        // concurrently.
        for chunk in &chunks {
            match self.llm.analyze(chunk, &context, &pr_info.title, &pr_body).await {
                Ok(response) => {
                    tools_run.push(format!("llm[{}]", self.llm.provider_tag()));
                    issues.extend(response.issues);
                }
                Err(err) => {
                    tools_failed.push(format!("llm[{}]", self.llm.provider_tag()));
                    warn!(chunk = chunk.index, %err, "llm analysis failed for chunk");
                }
            }
        }
        info!(event = ?ReviewEvent::AnalysisFinished { job_id: job.id.clone(), source: "llm".into(), issues: issues.len() as u32 }, "llm run finished");

        let aggregated = aggregator::aggregate(issues, self.config.confidence_threshold);
        info!(event = ?ReviewEvent::Aggregated { job_id: job.id.clone(), issues: aggregated.len() as u32 }, "aggregated");

        let report = risk_score::score(&aggregated, &self.config.score);
        info!(event = ?ReviewEvent::Scored { job_id: job.id.clone(), score: report.final_score, level: report.level }, "scored");

        let inline = aggregator::select_inline(&aggregated, self.config.max_inline_comments);

        let stats = ReviewStats {
            files_changed,
            files_reviewed: source_paths.len() as u32,
            chunks_analyzed: chunks.len() as u32,
            tools_run,
            tools_failed,
            issues_total: aggregated.len() as u32,
            issues_by_category: report.breakdown.clone(),
            latency_ms: started.elapsed().as_millis() as u64,
        };

        let output = ReviewOutput {
            job_id: job.id.clone(),
            owner: job.owner.clone(),
            repo: job.repo.clone(),
            pr_number: job.pr_number,
            sha: job.sha.clone(),
            issues: aggregated,
            risk_score: report.final_score,
            risk_level: report.level,
            stats,
        };

        self.post_and_finish(&job, check_run.as_ref().map(|c| c.id), &pr_info.head.sha, output, inline).await
    }

    async fn scan_lockfiles(
        &self,
        job: &ReviewJob,
        git_ref: &str,
        lockfiles: &[review_types::DiffFile],
        client: &OsvClient,
    ) -> Vec<Issue> {
        let fetches = lockfiles.iter().map(|file| {
            let path = file.effective_path().to_string();
            async move {
                let contents = self
                    .forge
                    .get_file_contents(job.installation_id, &job.owner, &job.repo, &path, git_ref)
                    .await
                    .ok()
                    .flatten();
                (path, contents)
            }
        });
        let fetched = futures::future::join_all(fetches).await;

        let scans = fetched.into_iter().filter_map(|(path, contents)| {
            let contents = contents?;
            let file_name = path.rsplit('/').next().unwrap_or(&path).to_string();
            Some(async move { vuln_scan::scan_manifest(client, &path, &file_name, &contents).await })
        });
        futures::future::join_all(scans).await.into_iter().flatten().collect()
    }

    /// README/CONTRIBUTING/lint-config snippets (spec §4.6) — best-effort,
    /// missing files simply leave that field `None`.
    async fn fetch_rag_context(&self, job: &ReviewJob, git_ref: &str) -> RagContext {
        async fn fetch(forge: &ForgeClient, job: &ReviewJob, git_ref: &str, path: &str) -> Option<String> {
            forge
                .get_file_contents(job.installation_id, &job.owner, &job.repo, path, git_ref)
                .await
                .ok()
                .flatten()
        }

        let readme = fetch(&self.forge, job, git_ref, "README.md").await;
        let contributing = fetch(&self.forge, job, git_ref, "CONTRIBUTING.md").await;
        let lint_config = fetch(&self.forge, job, git_ref, ".eslintrc.json").await;

        RagContext {
            readme,
            contributing,
            lint_config,
        }
    }

    fn empty_output(&self, job: &ReviewJob, files_changed: u32, elapsed: std::time::Duration) -> ReviewOutput {
        ReviewOutput {
            job_id: job.id.clone(),
            owner: job.owner.clone(),
            repo: job.repo.clone(),
            pr_number: job.pr_number,
            sha: job.sha.clone(),
            issues: Vec::new(),
            risk_score: 0.0,
            risk_level: RiskLevel::Low,
            stats: ReviewStats {
                files_changed,
                latency_ms: elapsed.as_millis() as u64,
                ..ReviewStats::default()
            },
        }
    }

    /// `risk_level=critical -> REQUEST_CHANGES`; `risk_score<10 and zero
    /// inline comments -> APPROVE`; else `COMMENT` (spec §4.9).
    fn choose_event(output: &ReviewOutput, inline_count: usize) -> &'static str {
        if output.risk_level == RiskLevel::Critical {
            "REQUEST_CHANGES"
        } else if output.risk_score < 10.0 && inline_count == 0 {
            "APPROVE"
        } else {
            "COMMENT"
        }
    }

    fn summary_body(output: &ReviewOutput) -> String {
        if output.stats.issues_total == 0 && output.issues.is_empty() && output.stats.files_changed == 0 {
            return "revguard: no reviewable files in this diff.".to_string();
        }
        format!(
            "revguard automated review\n\nRisk score: {:.1} ({:?})\nIssues found: {} across {} files reviewed ({} chunks analyzed)\nTools run: {}\nTools failed: {}",
            output.risk_score,
            output.risk_level,
            output.stats.issues_total,
            output.stats.files_reviewed,
            output.stats.chunks_analyzed,
            output.stats.tools_run.join(", "),
            output.stats.tools_failed.join(", "),
        )
    }

    async fn post_and_finish(
        &self,
        job: &ReviewJob,
        check_run_id: Option<u64>,
        commit_id: &str,
        output: ReviewOutput,
        inline: Vec<Issue>,
    ) -> ReviewResult {
        let event = Self::choose_event(&output, inline.len());
        let comments = inline
            .iter()
            .map(|issue| ReviewComment::new(issue.file_path.clone(), issue.line_start, issue.message.clone()))
            .collect();

        let request = PostReviewRequest {
            commit_id: commit_id.to_string(),
            body: Self::summary_body(&output),
            event,
            comments,
        };

        if let Err(err) = self
            .forge
            .post_review(job.installation_id, &job.owner, &job.repo, job.pr_number, &request)
            .await
        {
            return self.fail_job(job, check_run_id, Error::Post(err).to_string()).await;
        }
        info!(event = ?ReviewEvent::Posted { job_id: job.id.clone() }, "review posted");

        if let Some(check_run_id) = check_run_id {
            let conclusion = match event {
                "REQUEST_CHANGES" => "failure",
                _ => "success",
            };
            self.forge
                .update_check_run(job.installation_id, &job.owner, &job.repo, check_run_id, conclusion)
                .await;
        }

        info!(
            job_id = %job.id,
            risk_score = output.risk_score,
            issues = output.stats.issues_total,
            tools_run = ?output.stats.tools_run,
            tools_failed = ?output.stats.tools_failed,
            latency_ms = output.stats.latency_ms,
            "job completed"
        );
        ReviewResult::ok(output)
    }

    async fn fail_job(&self, job: &ReviewJob, check_run_id: Option<u64>, reason: String) -> ReviewResult {
        error!(event = ?ReviewEvent::Failed { job_id: job.id.clone(), reason: reason.clone() }, "job failed");
        if let Some(check_run_id) = check_run_id {
            self.forge
                .update_check_run(job.installation_id, &job.owner, &job.repo, check_run_id, "failure")
                .await;
        }
        ReviewResult::fail(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_types::{CategoryBreakdown, ReviewStats};

    fn output(risk_score: f64, risk_level: RiskLevel) -> ReviewOutput {
        ReviewOutput {
            job_id: "job".into(),
            owner: "acme".into(),
            repo: "widgets".into(),
            pr_number: 1,
            sha: "sha".into(),
            issues: Vec::new(),
            risk_score,
            risk_level,
            stats: ReviewStats {
                issues_by_category: CategoryBreakdown::default(),
                ..ReviewStats::default()
            },
        }
    }

    #[test]
    fn critical_risk_requests_changes() {
        let out = output(90.0, RiskLevel::Critical);
        assert_eq!(Orchestrator::choose_event(&out, 3), "REQUEST_CHANGES");
    }

    #[test]
    fn low_score_with_no_inline_comments_approves() {
        let out = output(5.0, RiskLevel::Low);
        assert_eq!(Orchestrator::choose_event(&out, 0), "APPROVE");
    }

    #[test]
    fn low_score_with_inline_comments_still_comments() {
        let out = output(5.0, RiskLevel::Low);
        assert_eq!(Orchestrator::choose_event(&out, 2), "COMMENT");
    }

    #[test]
    fn medium_score_comments() {
        let out = output(45.0, RiskLevel::Medium);
        assert_eq!(Orchestrator::choose_event(&out, 0), "COMMENT");
    }
}
