//! Token-selection precedence chains for safe-output handler jobs
//! (spec.md §4.6). Copilot-flavored outputs (`create-agent-session`,
//! `assign-to-agent`) deliberately exclude the default `GITHUB_TOKEN`
//! fallback since it lacks bot-agent scopes.

use crate::kind::SafeOutputKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPrecedence {
    /// custom → top-level `github-token` → `GH_AW_GITHUB_TOKEN || GITHUB_TOKEN`.
    Standard,
    /// custom → top-level `github-token` → `GH_AW_GITHUB_TOKEN` only (no
    /// `GITHUB_TOKEN` fallback).
    CopilotFlavored,
}

impl TokenPrecedence {
    pub fn for_kind(kind: SafeOutputKind) -> Self {
        if kind.is_copilot_flavored() {
            Self::CopilotFlavored
        } else {
            Self::Standard
        }
    }
}

/// Resolve the `${{ secrets.* }}` expression a handler job should use.
pub fn select_token(kind: SafeOutputKind, custom: Option<&str>, top_level: Option<&str>) -> String {
    select_token_for_precedence(TokenPrecedence::for_kind(kind), custom, top_level)
}

/// Same precedence chain as [`select_token`], for the user-defined
/// safe-job escape hatch: those entries have no fixed [`SafeOutputKind`] to
/// key off of, but still resolve a token through the standard chain.
pub fn select_token_for_precedence(precedence: TokenPrecedence, custom: Option<&str>, top_level: Option<&str>) -> String {
    if let Some(custom) = custom {
        return custom.to_string();
    }
    if let Some(top_level) = top_level {
        return top_level.to_string();
    }
    match precedence {
        TokenPrecedence::Standard => "${{ secrets.GH_AW_GITHUB_TOKEN || secrets.GITHUB_TOKEN }}".to_string(),
        TokenPrecedence::CopilotFlavored => "${{ secrets.GH_AW_GITHUB_TOKEN }}".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copilot_flavored_chain_excludes_default_github_token() {
        let token = select_token(SafeOutputKind::AssignToAgent, None, None);
        assert!(!token.contains("secrets.GITHUB_TOKEN "));
        assert!(token.contains("GH_AW_GITHUB_TOKEN"));
    }

    #[test]
    fn standard_chain_falls_back_to_github_token() {
        let token = select_token(SafeOutputKind::CreateIssue, None, None);
        assert!(token.contains("|| secrets.GITHUB_TOKEN"));
    }

    #[test]
    fn custom_token_wins_over_everything() {
        let token = select_token(SafeOutputKind::CreateIssue, Some("${{ secrets.MY_TOKEN }}"), Some("${{ secrets.TOP }}"));
        assert_eq!(token, "${{ secrets.MY_TOKEN }}");
    }
}
