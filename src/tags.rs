///////////////////////////////////////
// The store of OSM tags of a solid  //
///////////////////////////////////////

// OSM delivers strings, but the batch adds numbers (id) and a filter may ask with numbers.
// So a value is a string or a number and every comparison knows which one it got.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

pub static KEY_HEIGHT: &str = "height";
pub static KEY_LEVELS: &str = "building:levels";
pub static KEY_LEVELS_SHORT: &str = "levels";
pub static KEY_BUILDING: &str = "building";
pub static KEY_TYPE: &str = "type";
pub static KEY_AMENITY: &str = "amenity";
pub static KEY_SHOP: &str = "shop";
pub static KEY_OFFICE: &str = "office";
pub static KEY_HIGHWAY: &str = "highway";
pub static KEY_NAME: &str = "name";
pub static KEY_ID: &str = "id";
pub static KEY_ACTUAL_HEIGHT: &str = "actualHeight";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Number(f64),
    Text(String),
}

impl TagValue {
    /// The value as it reads in a string context, numbers without a trailing ".0".
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            TagValue::Text(text) => Cow::Borrowed(text.as_str()),
            TagValue::Number(number) => Cow::Owned(number.to_string()),
        }
    }

    pub fn to_lowercase(&self) -> String {
        self.as_text().to_lowercase()
    }

    /// Lenient number: the leading number of a text ("12 m" is 12).
    pub fn leading_number(&self) -> Option<f64> {
        match self {
            TagValue::Number(number) if !number.is_nan() => Some(*number),
            TagValue::Number(_) => None,
            TagValue::Text(text) => parse_float_prefix(text),
        }
    }

    /// Strict number: the whole text must be a number, a blank text counts as 0.
    pub fn whole_number(&self) -> Option<f64> {
        match self {
            TagValue::Number(number) if !number.is_nan() => Some(*number),
            TagValue::Number(_) => None,
            TagValue::Text(text) => parse_whole_number(text),
        }
    }

    /// Equality across representations: "35" equals 35, texts must match exactly.
    pub fn loose_eq(&self, other: &TagValue) -> bool {
        match (self, other) {
            (TagValue::Text(a), TagValue::Text(b)) => a == b,
            (TagValue::Number(a), TagValue::Number(b)) => a == b,
            (TagValue::Number(number), text @ TagValue::Text(_))
            | (text @ TagValue::Text(_), TagValue::Number(number)) => {
                text.whole_number() == Some(*number)
            }
        }
    }

    // An empty text or a zero does not count as present for the alias keys
    fn is_blank(&self) -> bool {
        match self {
            TagValue::Text(text) => text.is_empty(),
            TagValue::Number(number) => *number == 0.0 || number.is_nan(),
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for TagValue {
    fn from(text: &str) -> Self {
        TagValue::Text(text.to_string())
    }
}

impl From<String> for TagValue {
    fn from(text: String) -> Self {
        TagValue::Text(text)
    }
}

impl From<f64> for TagValue {
    fn from(number: f64) -> Self {
        TagValue::Number(number)
    }
}

/// Reads the longest leading number of a text, like OSM editors do with "12 m" or "100ft".
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        digits += fraction_end - fraction_start;
        end = fraction_end;
    }
    if digits == 0 {
        return None;
    }

    // exponent only counts if digits follow
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exponent_end = end + 1;
        if exponent_end < bytes.len()
            && (bytes[exponent_end] == b'+' || bytes[exponent_end] == b'-')
        {
            exponent_end += 1;
        }
        let exponent_digits_start = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits_start {
            end = exponent_end;
        }
    }

    text[..end].parse().ok()
}

fn parse_whole_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    // keep "inf" and "nan" spellings out
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    text.parse::<f64>().ok().filter(|number| !number.is_nan())
}

/// A filter attribute. Two keys have an alias when they are missing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Attribute<'a> {
    /// `building:levels`, else `levels`
    BuildingLevels,
    /// `building`, else `type`
    Building,
    Key(&'a str),
}

impl<'a> Attribute<'a> {
    pub fn parse(name: &'a str) -> Self {
        match name {
            "building:levels" => Attribute::BuildingLevels,
            "building" => Attribute::Building,
            _ => Attribute::Key(name),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, TagValue>);

impl Tags {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TagValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TagValue)> {
        self.0.iter()
    }

    /// Value of a filter attribute, following the alias keys.
    pub fn attribute(&self, attribute: Attribute<'_>) -> Option<&TagValue> {
        match attribute {
            Attribute::BuildingLevels => self
                .present(KEY_LEVELS)
                .or_else(|| self.get(KEY_LEVELS_SHORT)),
            Attribute::Building => self.present(KEY_BUILDING).or_else(|| self.get(KEY_TYPE)),
            Attribute::Key(key) => self.get(key),
        }
    }

    fn present(&self, key: &str) -> Option<&TagValue> {
        self.get(key).filter(|value| !value.is_blank())
    }

    // ** typed accessors of the keys the scene reads **

    pub fn height(&self) -> Option<&TagValue> {
        self.get(KEY_HEIGHT)
    }

    pub fn building_levels(&self) -> Option<&TagValue> {
        self.get(KEY_LEVELS)
    }

    pub fn building(&self) -> Option<Cow<'_, str>> {
        self.get(KEY_BUILDING).map(TagValue::as_text)
    }

    pub fn amenity(&self) -> Option<Cow<'_, str>> {
        self.get(KEY_AMENITY).map(TagValue::as_text)
    }

    pub fn shop(&self) -> Option<Cow<'_, str>> {
        self.get(KEY_SHOP).map(TagValue::as_text)
    }

    pub fn office(&self) -> Option<Cow<'_, str>> {
        self.get(KEY_OFFICE).map(TagValue::as_text)
    }

    pub fn highway(&self) -> Option<Cow<'_, str>> {
        self.get(KEY_HIGHWAY).map(TagValue::as_text)
    }

    pub fn name(&self) -> Option<Cow<'_, str>> {
        self.get(KEY_NAME).map(TagValue::as_text)
    }
}

impl<K: Into<String>, V: Into<TagValue>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for (key, value) in iter {
            tags.insert(key, value);
        }
        tags
    }
}
