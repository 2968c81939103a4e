//! Heredoc prompt chunking (spec.md §4.8): the workflow body is written to
//! `$GH_AW_PROMPT` via one or more `cat >> ... << 'EOF'` heredoc blocks,
//! each capped at 16KB so no single shell line exceeds what `bash` and the
//! GitHub Actions log viewer comfortably handle. Grounded on
//! `weave::compiler`'s own chunked-write discipline for large generated
//! artifacts, retargeted from its TOML output file to a heredoc-written
//! prompt file.

use gh_aw_core::StepSpec;

const CHUNK_BYTES: usize = 16 * 1024;
/// Upper bound on heredoc blocks; past this the final chunk absorbs the
/// remainder rather than growing the step indefinitely.
const MAX_CHUNKS: usize = 64;

pub const PROMPT_PATH: &str = "/tmp/gh-aw/aw-prompt.md";

/// Split `body` into ordered chunks no larger than 16KB, on UTF-8 character
/// boundaries, capping the chunk count so the final chunk absorbs whatever
/// remains past `MAX_CHUNKS - 1` splits.
pub fn chunk_prompt(body: &str) -> Vec<&str> {
    if body.len() <= CHUNK_BYTES {
        return vec![body];
    }
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < body.len() && chunks.len() + 1 < MAX_CHUNKS {
        let mut boundary = (start + CHUNK_BYTES).min(body.len());
        while boundary > start && !body.is_char_boundary(boundary) {
            boundary -= 1;
        }
        if boundary == start {
            // Pathological: a single char wider than CHUNK_BYTES; take it whole.
            boundary = body[start..].chars().next().map_or(body.len(), |c| start + c.len_utf8());
        }
        chunks.push(&body[start..boundary]);
        start = boundary;
    }
    if start < body.len() {
        chunks.push(&body[start..]);
    }
    chunks
}

/// Build the step that materializes `$GH_AW_PROMPT` from `body`, one
/// heredoc block per chunk, using a distinct delimiter per block so no
/// chunk's own content can prematurely terminate the heredoc.
pub fn write_prompt_step(body: &str) -> StepSpec {
    let chunks = chunk_prompt(body);
    let mut script = String::from("mkdir -p \"$(dirname \"$GH_AW_PROMPT\")\"\nrm -f \"$GH_AW_PROMPT\"\n");
    for (index, chunk) in chunks.iter().enumerate() {
        let delimiter = format!("GH_AW_PROMPT_CHUNK_{index}");
        script.push_str(&format!(
            "cat >> \"$GH_AW_PROMPT\" << '{delimiter}'\n{chunk}\n{delimiter}\n"
        ));
    }
    StepSpec::run(script)
        .named("Write agent prompt")
        .with_env("GH_AW_PROMPT", PROMPT_PATH)
}
