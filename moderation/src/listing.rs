//! `/filters` command: lists every configured trigger, sorted, chunked to fit a message.

/// Header line of every listing message.
pub const LISTING_HEADER: &str = "*Available Filters:*";
/// A single listing longer than this is split into chunks.
pub const MAX_LISTING_CHARS: usize = 4000;
/// Triggers per chunk when splitting.
pub const TRIGGERS_PER_CHUNK: usize = 80;

/// Sorts triggers case-insensitively, ignoring leading `/`. Ties keep input order.
pub fn sorted_triggers<'a, I>(triggers: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = triggers.into_iter().collect();
    sorted.sort_by_cached_key(|t| t.trim_start_matches('/').to_lowercase());
    sorted
}

/// Builds the Markdown messages answering `/filters`.
pub fn filter_listing<'a, I>(triggers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let formatted: Vec<String> = sorted_triggers(triggers)
        .into_iter()
        .map(|t| format!("`{}`", escape_code(t)))
        .collect();

    let single = render(&formatted);
    if single.chars().count() <= MAX_LISTING_CHARS {
        return vec![single];
    }
    formatted.chunks(TRIGGERS_PER_CHUNK).map(render).collect()
}

/// Inside a MarkdownV2 code span only `` ` `` and `\` need escaping.
fn escape_code(trigger: &str) -> String {
    trigger.replace('\\', "\\\\").replace('`', "\\`")
}

fn render(lines: &[String]) -> String {
    let mut out = String::from(LISTING_HEADER);
    for line in lines {
        out.push('\n');
        out.push_str(line);
    }
    out
}

/// True for `/filters` and `/filters@botname`, optionally followed by arguments.
pub fn is_filters_command(text: &str) -> bool {
    let Some(command) = text.split_whitespace().next() else {
        return false;
    };
    let command = command.split('@').next().unwrap_or(command);
    command.eq_ignore_ascii_case("/filters")
}
