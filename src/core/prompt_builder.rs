use crate::domain::models::{AggregatedContext, FileRecord, TextEncoding};
use log::debug;

pub const TRUNCATION_MARKER: &str = "... [Content Truncated] ...";

const README_INSTRUCTIONS: &str = "\
You are an expert Technical Writer and Developer Advocate. Your goal is to analyze a codebase and generate a professional, comprehensive, and clear README.md file.

Your output must be strictly in VALID MARKDOWN format.

You will be provided with:
1. A directory tree structure of the project.
2. The contents of key files in the project.

Your task is to:
1. **Analyze the Project Structure**: Understand the organization of the code.
2. **Analyze File Contents**: Determine the purpose of the modules, classes, and functions.
3. **Identify Key Information**:
    - Project Name and Description (What does it do?)
    - Key Features (What are the main capabilities?)
    - Installation Instructions (How to set it up? Look for manifests and build files.)
    - Usage Examples (How to run it? Look for entry points and CLI definitions.)
    - Technologies Used (Languages, libraries, frameworks).
4. **Generate the README.md**:
    - Use a clear and professional structure.
    - Include Badges if applicable.
    - Write a compelling introduction.
    - Provide step-by-step installation and usage guides.
    - If you see tests, mention how to run them.

**Strict Output Rules:**
- The output must be ONLY the markdown content of the README.md.
- Do not include conversational filler like \"Here is the README\".
- Ensure all code blocks are properly fenced.";

fn count_tokens(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Shortest backtick fence (at least three) that cannot close early on a run
/// inside the content.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

fn language_tag(file: &FileRecord) -> String {
    file.extension()
        .map(str::to_lowercase)
        .unwrap_or_else(|| "text".to_string())
}

pub fn render_file_block(file: &FileRecord) -> String {
    let fence = fence_for(&file.content);
    let mut block = format!(
        "\n## File: {}\n{}{}\n{}",
        file.relative_path,
        fence,
        language_tag(file),
        file.content
    );
    if !file.content.is_empty() && !file.content.ends_with('\n') {
        block.push('\n');
    }
    if file.truncated {
        block.push_str(TRUNCATION_MARKER);
        block.push('\n');
    }
    block.push_str(&fence);
    block.push('\n');
    block
}

/// Tree first, then one fenced block per file in tree order.
pub fn render_context(context: &AggregatedContext) -> String {
    debug!("Rendering context with {} files", context.files.len());
    let mut result = String::new();

    result.push_str("# Project Directory Tree\n```\n");
    result.push_str(&context.tree_text);
    result.push_str("\n```\n\n# File Contents\n");

    for file in &context.files {
        result.push_str(&render_file_block(file));
    }

    result
}

pub fn build_prompt(context: &AggregatedContext) -> String {
    let rendered = render_context(context);
    let prompt = format!("{README_INSTRUCTIONS}\n\nHere is the codebase information:\n\n{rendered}");
    debug!(
        "Built prompt: {} chars, ~{} tokens",
        prompt.chars().count(),
        count_tokens(&prompt)
    );
    prompt
}

fn describe_file(file: &FileRecord) -> String {
    let mut line = if file.truncated {
        format!(
            "  {} ({} bytes, truncated to {} chars",
            file.relative_path,
            file.original_bytes,
            file.content.chars().count()
        )
    } else {
        format!("  {} ({} chars", file.relative_path, file.original_chars)
    };
    if file.encoding == TextEncoding::Latin1 {
        line.push_str(", latin-1");
    }
    line.push(')');
    line
}

pub fn dry_run_report(context: &AggregatedContext, prompt: &str) -> String {
    let summary = &context.summary;
    let files: Vec<String> = context.files.iter().map(describe_file).collect();
    format!(
        "[DRY RUN MODE]\n\n\
         Analysis of {} complete. No LLM was called.\n\
         - Files included: {}\n\
         - Files truncated: {}\n\
         - Files skipped: {}\n\
         - Bytes read: {}\n\
         - Prompt size: {} characters (~{} tokens)\n\n\
         {}\n\n\
         Included files:\n\
         {}\n\n\
         --- PROMPT ---\n\
         {}\n",
        context.root_name,
        summary.files_included,
        summary.files_truncated,
        summary.files_skipped(),
        summary.bytes_read,
        prompt.chars().count(),
        count_tokens(prompt),
        context.tree_text,
        files.join("\n"),
        prompt
    )
}
