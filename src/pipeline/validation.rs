//! Validation engine for pipeline configurations.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`PipelineConfig`] and collects every diagnostic into a
//! [`ValidationReport`]. It never short-circuits on the first error, so users
//! see all problems at once.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use review_insight::pipeline::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&config);
//! if report.has_errors() {
//!     for err in report.errors() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use serde::Serialize;

use super::config::*;
use super::error_code::ErrorCode;
use super::errors::PipelineConfigError;
use crate::nlp::stopwords::StopwordFilter;

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding: an error or warning attached to a
/// [`PipelineConfigError`] that carries the code, path, message, and hint.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: PipelineConfigError,
}

impl ValidationDiagnostic {
    pub fn error(err: PipelineConfigError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: PipelineConfigError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &PipelineConfigError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &PipelineConfigError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Total number of diagnostics (errors + warnings).
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`PipelineConfig`] and returns
/// zero or more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so one engine can be shared
/// across threads.
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"summary_ranges"`).
    fn name(&self) -> &str;

    /// Inspect `config` and return any findings.
    fn validate(&self, config: &PipelineConfig) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`PipelineConfig`] and collects
/// all diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(SummaryRangesRule));
        engine.add_rule(Box::new(ClusteringRangesRule));
        engine.add_rule(Box::new(ClusteringComboRule));
        engine.add_rule(Box::new(BatchAndReductionRule));
        engine.add_rule(Box::new(StopwordsRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in execution order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run all rules against `config` and return the collected report.
    pub fn validate(&self, config: &PipelineConfig) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(config));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn out_of_range(path: &str, message: String, hint: &str) -> ValidationDiagnostic {
    ValidationDiagnostic::error(
        PipelineConfigError::new(ErrorCode::OutOfRange, path, message).with_hint(hint),
    )
}

fn require_positive(out: &mut Vec<ValidationDiagnostic>, path: &str, value: usize) {
    if value == 0 {
        let field = path.rsplit('/').next().unwrap_or(path);
        out.push(out_of_range(
            path,
            format!("{field} must be greater than 0"),
            "Use a positive value",
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. TextRank parameters ─────────────────────────────────────────────────

struct SummaryRangesRule;

impl ValidationRule for SummaryRangesRule {
    fn name(&self) -> &str {
        "summary_ranges"
    }

    fn validate(&self, config: &PipelineConfig) -> Vec<ValidationDiagnostic> {
        let summary = &config.summary;
        let mut out = Vec::new();

        if !(summary.damping > 0.0 && summary.damping < 1.0) {
            out.push(out_of_range(
                "/summary/damping",
                format!("damping must be in (0, 1), got {}", summary.damping),
                "The usual value is 0.85",
            ));
        }
        require_positive(&mut out, "/summary/top_k_sentences", summary.top_k_sentences);
        require_positive(&mut out, "/summary/max_iterations", summary.max_iterations);
        if !(summary.convergence_threshold.is_finite() && summary.convergence_threshold > 0.0) {
            out.push(out_of_range(
                "/summary/convergence_threshold",
                format!(
                    "convergence_threshold must be a positive number, got {}",
                    summary.convergence_threshold
                ),
                "The usual value is 1e-6",
            ));
        }
        if !(0.0..=1.0).contains(&summary.redundancy_threshold) {
            out.push(out_of_range(
                "/summary/redundancy_threshold",
                format!(
                    "redundancy_threshold must be in [0, 1], got {}",
                    summary.redundancy_threshold
                ),
                "Set it to 1.0 to disable redundancy filtering",
            ));
        }

        out
    }
}

// ─── 2. Clustering parameters ───────────────────────────────────────────────

struct ClusteringRangesRule;

impl ValidationRule for ClusteringRangesRule {
    fn name(&self) -> &str {
        "clustering_ranges"
    }

    fn validate(&self, config: &PipelineConfig) -> Vec<ValidationDiagnostic> {
        let clustering = &config.clustering;
        let mut out = Vec::new();

        require_positive(&mut out, "/clustering/cluster_count", clustering.cluster_count);
        require_positive(
            &mut out,
            "/clustering/min_cluster_size",
            clustering.min_cluster_size,
        );
        require_positive(&mut out, "/clustering/max_iterations", clustering.max_iterations);

        if let Some(eps) = clustering.eps {
            if !(eps.is_finite() && eps > 0.0) {
                out.push(out_of_range(
                    "/clustering/eps",
                    format!("eps must be a positive number, got {eps}"),
                    "Remove eps to estimate it from the data",
                ));
            }
        }
        if !(clustering.tolerance.is_finite() && clustering.tolerance >= 0.0) {
            out.push(out_of_range(
                "/clustering/tolerance",
                format!(
                    "tolerance must be a non-negative number, got {}",
                    clustering.tolerance
                ),
                "The usual value is 1e-4",
            ));
        }

        out
    }
}

// ─── 3. Parameters that the chosen method ignores ───────────────────────────

struct ClusteringComboRule;

impl ValidationRule for ClusteringComboRule {
    fn name(&self) -> &str {
        "clustering_combo"
    }

    fn validate(&self, config: &PipelineConfig) -> Vec<ValidationDiagnostic> {
        let clustering = &config.clustering;
        if clustering.method == ClusteringMethod::Kmeans && clustering.eps.is_some() {
            vec![ValidationDiagnostic::warning(
                PipelineConfigError::new(
                    ErrorCode::InvalidCombo,
                    "/clustering/eps",
                    "eps is ignored by kmeans clustering",
                )
                .with_hint("Set method to \"density\" or remove eps"),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 4. Embedding batches, reduction and report sizes ───────────────────────

struct BatchAndReductionRule;

impl ValidationRule for BatchAndReductionRule {
    fn name(&self) -> &str {
        "batch_and_reduction"
    }

    fn validate(&self, config: &PipelineConfig) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();

        require_positive(&mut out, "/embedding_batch_size", config.embedding_batch_size);
        require_positive(
            &mut out,
            "/report/keywords_per_cluster",
            config.report.keywords_per_cluster,
        );
        require_positive(
            &mut out,
            "/report/samples_per_cluster",
            config.report.samples_per_cluster,
        );
        if config.reduction.target_dimensions == Some(0) {
            out.push(out_of_range(
                "/reduction/target_dimensions",
                "target_dimensions must be greater than 0".to_string(),
                "Set target_dimensions to null to cluster raw embeddings",
            ));
        }

        out
    }
}

// ─── 5. Tokenizer settings ──────────────────────────────────────────────────

struct StopwordsRule;

impl ValidationRule for StopwordsRule {
    fn name(&self) -> &str {
        "stopwords"
    }

    fn validate(&self, config: &PipelineConfig) -> Vec<ValidationDiagnostic> {
        let stopwords = &config.stopwords;
        let mut out = Vec::new();

        require_positive(
            &mut out,
            "/stopwords/min_token_length",
            stopwords.min_token_length,
        );
        if stopwords.words.is_none() && !StopwordFilter::is_supported_language(&stopwords.language)
        {
            out.push(ValidationDiagnostic::warning(
                PipelineConfigError::new(
                    ErrorCode::UnsupportedValue,
                    "/stopwords/language",
                    format!(
                        "no stopword list for \"{}\"; English is used instead",
                        stopwords.language
                    ),
                )
                .with_hint("Use an ISO 639-1 code such as en, de, fr or supply words"),
            ));
        }

        out
    }
}

// ─── 6. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    /// Collect unknown-field diagnostics at the given JSON pointer `path`
    /// from the extra fields captured by `#[serde(flatten)]`.
    fn check_unknowns(
        path: &str,
        unknowns: &UnknownFields,
        strict: bool,
    ) -> Vec<ValidationDiagnostic> {
        unknowns
            .keys()
            .map(|key| {
                let diag_fn = if strict {
                    ValidationDiagnostic::error
                } else {
                    ValidationDiagnostic::warning
                };
                diag_fn(
                    PipelineConfigError::new(
                        ErrorCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, config: &PipelineConfig) -> Vec<ValidationDiagnostic> {
        let sections: [(&str, &UnknownFields); 6] = [
            ("", &config.unknown_fields),
            ("/summary", &config.summary.unknown_fields),
            ("/clustering", &config.clustering.unknown_fields),
            ("/reduction", &config.reduction.unknown_fields),
            ("/report", &config.report.unknown_fields),
            ("/stopwords", &config.stopwords.unknown_fields),
        ];
        sections
            .iter()
            .flat_map(|(path, unknowns)| Self::check_unknowns(path, unknowns, config.strict))
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: build a PipelineConfig from JSON.
    fn config(json: &str) -> PipelineConfig {
        PipelineConfig::from_json(json).unwrap()
    }

    fn engine() -> ValidationEngine {
        ValidationEngine::with_defaults()
    }

    // ─── Valid configs ──────────────────────────────────────────────────

    #[test]
    fn test_empty_config_is_valid() {
        let report = engine().validate(&config("{}"));
        assert!(report.is_valid());
        assert!(report.is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(engine().validate(&PipelineConfig::default()).is_empty());
    }

    #[test]
    fn test_density_with_eps_is_valid() {
        let report = engine().validate(&config(
            r#"{ "clustering": { "method": "density", "eps": 0.5, "min_cluster_size": 3 } }"#,
        ));
        assert!(report.is_empty());
    }

    // ─── Rule: summary_ranges ───────────────────────────────────────────

    #[test]
    fn test_damping_out_of_range_fails() {
        for damping in ["0.0", "1.0", "1.5", "-0.2"] {
            let report = engine().validate(&config(&format!(
                r#"{{ "summary": {{ "damping": {damping} }} }}"#
            )));
            let errs: Vec<_> = report.errors().collect();
            assert_eq!(errs.len(), 1, "damping {damping}");
            assert_eq!(errs[0].code, ErrorCode::OutOfRange);
            assert_eq!(errs[0].path, "/summary/damping");
        }
    }

    #[test]
    fn test_zero_top_k_fails() {
        let report = engine().validate(&config(r#"{ "summary": { "top_k_sentences": 0 } }"#));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].path.ends_with("top_k_sentences"));
    }

    #[test]
    fn test_redundancy_threshold_bounds() {
        let report =
            engine().validate(&config(r#"{ "summary": { "redundancy_threshold": 1.0 } }"#));
        assert!(report.is_valid());

        let report =
            engine().validate(&config(r#"{ "summary": { "redundancy_threshold": 1.2 } }"#));
        assert!(report.has_errors());
    }

    #[test]
    fn test_zero_convergence_threshold_fails() {
        let report =
            engine().validate(&config(r#"{ "summary": { "convergence_threshold": 0 } }"#));
        assert!(report.has_errors());
    }

    // ─── Rule: clustering_ranges / clustering_combo ─────────────────────

    #[test]
    fn test_zero_cluster_count_and_min_size_report_two_errors() {
        let report = engine().validate(&config(
            r#"{ "clustering": { "cluster_count": 0, "min_cluster_size": 0 } }"#,
        ));
        assert_eq!(report.errors().count(), 2);
    }

    #[test]
    fn test_negative_eps_fails() {
        let report = engine().validate(&config(
            r#"{ "clustering": { "method": "density", "eps": -1.0 } }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "/clustering/eps");
    }

    #[test]
    fn test_eps_with_kmeans_is_warning() {
        let report = engine().validate(&config(r#"{ "clustering": { "eps": 0.5 } }"#));
        assert!(report.is_valid());
        let warns: Vec<_> = report.warnings().collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].code, ErrorCode::InvalidCombo);
    }

    #[test]
    fn test_unknown_method_is_parse_error() {
        let err = PipelineConfig::from_json(r#"{ "clustering": { "method": "spectral" } }"#)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    // ─── Rule: batch_and_reduction ──────────────────────────────────────

    #[test]
    fn test_zero_batch_size_fails() {
        let report = engine().validate(&config(r#"{ "embedding_batch_size": 0 }"#));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "/embedding_batch_size");
    }

    #[test]
    fn test_zero_target_dimensions_fails() {
        let report = engine().validate(&config(r#"{ "reduction": { "target_dimensions": 0 } }"#));
        assert!(report.has_errors());

        let report =
            engine().validate(&config(r#"{ "reduction": { "target_dimensions": null } }"#));
        assert!(report.is_valid());
    }

    #[test]
    fn test_zero_report_sizes_fail() {
        let report = engine().validate(&config(
            r#"{ "report": { "keywords_per_cluster": 0, "samples_per_cluster": 0 } }"#,
        ));
        let paths: Vec<&str> = report.errors().map(|d| d.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/report/keywords_per_cluster", "/report/samples_per_cluster"]
        );

        let report = engine().validate(&config(
            r#"{ "report": { "keywords_per_cluster": 1, "samples_per_cluster": 1 } }"#,
        ));
        assert!(report.is_valid());
    }

    // ─── Rule: stopwords ────────────────────────────────────────────────

    #[test]
    fn test_unsupported_language_is_warning() {
        let report = engine().validate(&config(r#"{ "stopwords": { "language": "xx" } }"#));
        assert!(report.is_valid());
        let warns: Vec<_> = report.warnings().collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].code, ErrorCode::UnsupportedValue);
    }

    #[test]
    fn test_explicit_words_skip_language_check() {
        let report = engine().validate(&config(
            r#"{ "stopwords": { "language": "xx", "words": ["app"] } }"#,
        ));
        assert!(report.is_empty());
    }

    // ─── Rule: unknown_fields (strict mode) ─────────────────────────────

    #[test]
    fn test_unknown_fields_non_strict_are_warnings() {
        let report = engine().validate(&config(r#"{ "strict": false, "bogus": 42 }"#));
        assert!(report.is_valid()); // warnings don't make it invalid
        let warns: Vec<_> = report.warnings().collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].code, ErrorCode::UnknownField);
        assert!(warns[0].path.contains("bogus"));
    }

    #[test]
    fn test_unknown_fields_strict_are_errors() {
        let report = engine().validate(&config(r#"{ "strict": true, "bogus": 42 }"#));
        assert!(report.has_errors());
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::UnknownField);
    }

    #[test]
    fn test_unknown_nested_field_strict() {
        let report = engine().validate(&config(
            r#"{ "strict": true, "clustering": { "k": 4 } }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "/clustering/k");
    }

    // ─── Engine ─────────────────────────────────────────────────────────

    #[test]
    fn test_multiple_rules_fire_independently() {
        let report = engine().validate(&config(
            r#"{
                "strict": true,
                "bogus": true,
                "summary": { "damping": 2.0 },
                "embedding_batch_size": 0
            }"#,
        ));
        assert_eq!(report.errors().count(), 3);
    }

    #[test]
    fn test_custom_rule() {
        struct AlwaysWarnRule;
        impl ValidationRule for AlwaysWarnRule {
            fn name(&self) -> &str {
                "always_warn"
            }
            fn validate(&self, _config: &PipelineConfig) -> Vec<ValidationDiagnostic> {
                vec![ValidationDiagnostic::warning(PipelineConfigError::new(
                    ErrorCode::ValidationFailed,
                    "",
                    "custom warning",
                ))]
            }
        }

        let mut eng = ValidationEngine::new();
        eng.add_rule(Box::new(AlwaysWarnRule));
        assert_eq!(eng.rule_names(), vec!["always_warn"]);
        let report = eng.validate(&config("{}"));
        assert!(report.is_valid()); // warnings only
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = engine().validate(&config(r#"{ "summary": { "damping": 1.0 } }"#));
        let json = serde_json::to_value(&report).unwrap();
        let diags = json["diagnostics"].as_array().unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0]["severity"], "error");
        assert_eq!(diags[0]["code"], "out_of_range");
        assert_eq!(diags[0]["path"], "/summary/damping");
    }
}
