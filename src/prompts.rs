//! Prompt templates for the three review queries. Placeholders are
//! substituted with plain string replacement; code is inserted last so
//! braces inside the reviewed source never collide with a placeholder.

pub const BUG_DETECTION: &str = r#"You are an expert {language} code reviewer. Analyze the following code for bugs:

- logic errors and off-by-one mistakes
- unhandled error conditions and missing edge cases
- resource leaks and unsafe cleanup
- concurrency hazards
- security issues

Respond ONLY with a JSON object inside a ```json code fence, shaped exactly like:
{"bugs": [{"line": <line number or null>, "severity": "critical|major|minor", "description": "<what is wrong>", "suggestion": "<how to fix it>"}]}

If you find no bugs, respond with {"bugs": []}.

Code:
```{language}
{code}
```"#;

pub const OPTIMIZATION: &str = r#"You are an expert {language} performance engineer. Analyze the following code for optimization opportunities:

- algorithmic improvements and better data structures
- unnecessary allocations or copies
- redundant work inside loops
- I/O that could be batched or avoided
- idiomatic {language} constructs that would simplify the code

Respond ONLY with a JSON object inside a ```json code fence, shaped exactly like:
{"optimizations": [{"line": <line number or null>, "impact": "high|medium|low", "description": "<what could be better>", "suggestion": "<concrete change>"}]}

If you find nothing worth changing, respond with {"optimizations": []}.

Code:
```{language}
{code}
```"#;

pub const SUMMARY: &str = r#"A code review found {bug_count} potential bugs and {opt_count} optimization opportunities in one file.

Write a short summary (2-3 sentences) of the overall code health for the development team. Mention whether the findings need urgent attention. Respond with plain text only, no JSON and no code fences."#;

pub fn bug_detection(code: &str, language: &str) -> String {
    render(BUG_DETECTION, language, code)
}

pub fn optimization(code: &str, language: &str) -> String {
    render(OPTIMIZATION, language, code)
}

pub fn summary(bug_count: usize, opt_count: usize) -> String {
    SUMMARY
        .replace("{bug_count}", &bug_count.to_string())
        .replace("{opt_count}", &opt_count.to_string())
}

fn render(template: &str, language: &str, code: &str) -> String {
    template
        .replace("{language}", language)
        .replace("{code}", code)
}
