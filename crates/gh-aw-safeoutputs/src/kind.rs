//! The fixed set of safe-output kinds (spec.md §3), plus the one always
//! implicitly-enabled kind (`missing-tool`) and the escape hatch for
//! author-defined safe-jobs that aren't in the fixed set.

use gh_aw_core::Map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafeOutputKind {
    CreateIssue,
    AddComment,
    CreatePullRequest,
    PushToPullRequestBranch,
    CreateDiscussion,
    AddLabels,
    UpdateIssue,
    CreateCodeScanningAlert,
    UploadAsset,
    DispatchWorkflow,
    CreateProject,
    UpdateProject,
    CopyProject,
    CreateAgentSession,
    AddMilestone,
    AssignToAgent,
    MissingTool,
}

impl SafeOutputKind {
    pub const ALL: &'static [SafeOutputKind] = &[
        Self::CreateIssue,
        Self::AddComment,
        Self::CreatePullRequest,
        Self::PushToPullRequestBranch,
        Self::CreateDiscussion,
        Self::AddLabels,
        Self::UpdateIssue,
        Self::CreateCodeScanningAlert,
        Self::UploadAsset,
        Self::DispatchWorkflow,
        Self::CreateProject,
        Self::UpdateProject,
        Self::CopyProject,
        Self::CreateAgentSession,
        Self::AddMilestone,
        Self::AssignToAgent,
        Self::MissingTool,
    ];

    /// Parse a frontmatter key, tolerating either `-` or `_` form (spec.md
    /// §6 wire-protocol normalization rule applies to authoring too).
    pub fn parse(key: &str) -> Option<Self> {
        match normalize(key).as_str() {
            "create_issue" => Some(Self::CreateIssue),
            "add_comment" => Some(Self::AddComment),
            "create_pull_request" => Some(Self::CreatePullRequest),
            "push_to_pull_request_branch" => Some(Self::PushToPullRequestBranch),
            "create_discussion" => Some(Self::CreateDiscussion),
            "add_labels" => Some(Self::AddLabels),
            "update_issue" => Some(Self::UpdateIssue),
            "create_code_scanning_alert" => Some(Self::CreateCodeScanningAlert),
            "upload_asset" => Some(Self::UploadAsset),
            "dispatch_workflow" => Some(Self::DispatchWorkflow),
            "create_project" => Some(Self::CreateProject),
            "update_project" => Some(Self::UpdateProject),
            "copy_project" => Some(Self::CopyProject),
            "create_agent_session" => Some(Self::CreateAgentSession),
            "add_milestone" => Some(Self::AddMilestone),
            "assign_to_agent" => Some(Self::AssignToAgent),
            "missing_tool" => Some(Self::MissingTool),
            _ => None,
        }
    }

    /// Kebab-case job/tool name as it appears in emitted YAML.
    pub fn job_name(self) -> &'static str {
        match self {
            Self::CreateIssue => "create_issue",
            Self::AddComment => "add_comment",
            Self::CreatePullRequest => "create_pull_request",
            Self::PushToPullRequestBranch => "push_to_pull_request_branch",
            Self::CreateDiscussion => "create_discussion",
            Self::AddLabels => "add_labels",
            Self::UpdateIssue => "update_issue",
            Self::CreateCodeScanningAlert => "create_code_scanning_alert",
            Self::UploadAsset => "upload_asset",
            Self::DispatchWorkflow => "dispatch_workflow",
            Self::CreateProject => "create_project",
            Self::UpdateProject => "update_project",
            Self::CopyProject => "copy_project",
            Self::CreateAgentSession => "create_agent_session",
            Self::AddMilestone => "add_milestone",
            Self::AssignToAgent => "assign_to_agent",
            Self::MissingTool => "missing_tool",
        }
    }

    /// `GH_AW_<KIND>_` environment variable prefix (spec.md §6).
    pub fn env_prefix(self) -> String {
        self.job_name().to_uppercase()
    }

    /// Permission delta this kind's handler job needs (spec.md §4.6).
    pub fn permission_delta(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::CreateIssue | Self::UpdateIssue => &[("issues", "write")],
            Self::AddComment => &[("issues", "write"), ("pull-requests", "write")],
            Self::CreatePullRequest | Self::PushToPullRequestBranch => {
                &[("contents", "write"), ("pull-requests", "write")]
            }
            Self::CreateDiscussion => &[("discussions", "write")],
            Self::AddLabels => &[("issues", "write")],
            Self::CreateCodeScanningAlert => &[("security-events", "write")],
            Self::UploadAsset => &[("contents", "read")],
            Self::DispatchWorkflow => &[("actions", "write")],
            Self::CreateProject | Self::UpdateProject | Self::CopyProject => &[("repository-projects", "write")],
            Self::CreateAgentSession | Self::AssignToAgent => &[("contents", "read")],
            Self::AddMilestone => &[("issues", "write")],
            Self::MissingTool => &[],
        }
    }

    /// Copilot-flavored outputs use a distinct token-selection chain that
    /// deliberately excludes the default `GITHUB_TOKEN` fallback, since it
    /// lacks bot-agent scopes (spec.md §4.6).
    pub fn is_copilot_flavored(self) -> bool {
        matches!(self, Self::CreateAgentSession | Self::AssignToAgent)
    }

    /// `missing-tool` is always implicitly enabled whenever any other safe
    /// output is enabled, so the agent can report capability gaps.
    pub fn default_entry() -> (String, Map) {
        (Self::MissingTool.job_name().to_string(), Map::new())
    }
}

fn normalize(s: &str) -> String {
    s.replace('-', "_")
}
