//! Line tokenizer for the model reply format.
//!
//! Each non-blank line is trimmed and classified by the marker it contains.
//! A marker may sit anywhere in the line (`**FOUND_INGREDIENTS:**`,
//! `### RECIPE_1`, `1. NAME: Omelette`) but must not be glued to a word: the
//! character before it, and after it for markers without a colon, is not
//! alphanumeric or `_`. That keeps `FOUND_INGREDIENTS:` from reading as
//! `INGREDIENTS:` and `RECIPES_END` from reading as `RECIPE_END`. When a line
//! holds several markers the leftmost wins. Markers are case-sensitive.

pub const FOUND_INGREDIENTS: &str = "FOUND_INGREDIENTS:";
pub const RECIPES_START: &str = "RECIPES_START";
pub const RECIPES_END: &str = "RECIPES_END";
pub const RECIPE_HEADER_PREFIX: &str = "RECIPE_";
pub const RECIPE_END: &str = "RECIPE_END";
pub const NAME: &str = "NAME:";
pub const TIME: &str = "TIME:";
pub const INGREDIENTS: &str = "INGREDIENTS:";
pub const INSTRUCTIONS: &str = "INSTRUCTIONS:";

const ITEM_PREFIX: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    FoundIngredients,
    RecipesStart,
    RecipesEnd,
    /// `RECIPE_<n>`.
    RecipeHeader(u32),
    RecipeEnd,
    /// `NAME:` with its trimmed value, possibly empty.
    Name(&'a str),
    /// `TIME:` with its trimmed value, possibly empty.
    Time(&'a str),
    Ingredients,
    Instructions,
    /// A dash line with the leading dash stripped and the rest trimmed.
    Item(&'a str),
    /// Anything else.
    Text,
}

impl Token<'_> {
    /// True for tokens that carry recipe structure, as opposed to chatter.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Token::Text)
    }
}

/// A token with its 1-based source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub token: Token<'a>,
}

/// Tokenize a raw model reply. Blank lines produce no token.
pub fn tokenize(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        push_line(&mut lines, index + 1, raw);
    }
    lines
}

fn push_line<'a>(lines: &mut Vec<Line<'a>>, number: usize, raw: &'a str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }

    let (token, remainder) = classify(trimmed);
    lines.push(Line { number, token });

    // `INGREDIENTS: - eggs` carries its first item on the marker line.
    if let Some(rest) = remainder {
        push_line(lines, number, rest);
    }
}

#[derive(Clone, Copy)]
enum Marker {
    FoundIngredients,
    RecipesStart,
    RecipesEnd,
    RecipeEnd,
    Name,
    Time,
    Ingredients,
    Instructions,
}

const MARKERS: [(&str, Marker); 8] = [
    (FOUND_INGREDIENTS, Marker::FoundIngredients),
    (RECIPES_START, Marker::RecipesStart),
    (RECIPES_END, Marker::RecipesEnd),
    (RECIPE_END, Marker::RecipeEnd),
    (NAME, Marker::Name),
    (TIME, Marker::Time),
    (INGREDIENTS, Marker::Ingredients),
    (INSTRUCTIONS, Marker::Instructions),
];

fn classify(line: &str) -> (Token<'_>, Option<&str>) {
    if let Some(rest) = line.strip_prefix(ITEM_PREFIX) {
        return (Token::Item(rest.trim()), None);
    }

    let mut leftmost: Option<(usize, Marker, &str)> = None;
    for (text, marker) in MARKERS {
        if let Some((start, end)) = find_marker(line, text) {
            if leftmost.map_or(true, |(best, ..)| start < best) {
                leftmost = Some((start, marker, &line[end..]));
            }
        }
    }

    if let Some((start, number)) = recipe_header(line) {
        if leftmost.map_or(true, |(best, ..)| start < best) {
            return (Token::RecipeHeader(number), None);
        }
    }

    let Some((_, marker, rest)) = leftmost else {
        return (Token::Text, None);
    };
    let rest = strip_decoration(rest);

    match marker {
        Marker::FoundIngredients => (Token::FoundIngredients, Some(rest)),
        Marker::RecipesStart => (Token::RecipesStart, None),
        Marker::RecipesEnd => (Token::RecipesEnd, None),
        Marker::RecipeEnd => (Token::RecipeEnd, None),
        Marker::Name => (Token::Name(rest), None),
        Marker::Time => (Token::Time(rest), None),
        Marker::Ingredients => (Token::Ingredients, Some(rest)),
        Marker::Instructions => (Token::Instructions, Some(rest)),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte range of the first standalone occurrence of `marker` in `line`.
fn find_marker(line: &str, marker: &str) -> Option<(usize, usize)> {
    line.match_indices(marker)
        .map(|(start, m)| (start, start + m.len()))
        .find(|&(start, end)| {
            let before = line[..start].chars().next_back();
            let after = line[end..].chars().next();
            !before.is_some_and(is_word_char)
                && (marker.ends_with(':') || !after.is_some_and(is_word_char))
        })
}

/// First standalone `RECIPE_<digits>`, with its position and number.
fn recipe_header(line: &str) -> Option<(usize, u32)> {
    line.match_indices(RECIPE_HEADER_PREFIX).find_map(|(start, _)| {
        if line[..start].chars().next_back().is_some_and(is_word_char) {
            return None;
        }
        let tail = &line[start + RECIPE_HEADER_PREFIX.len()..];
        let len = tail.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 || tail[len..].chars().next().is_some_and(is_word_char) {
            return None;
        }
        tail[..len].parse().ok().map(|number| (start, number))
    })
}

/// Markdown emphasis and whitespace around a marker's value.
fn strip_decoration(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '`')
}
