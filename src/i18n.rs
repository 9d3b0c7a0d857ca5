use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display language of the site.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Bn,
    En,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::Bn => "bn",
            Lang::En => "en",
        }
    }

    /// Strict parse: only `bn` and `en` are languages.
    pub fn parse(s: &str) -> Option<Lang> {
        match s {
            "bn" => Some(Lang::Bn),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    /// Parse a stored preference; anything absent or unknown falls back to Bengali.
    pub fn from_pref(value: Option<&str>) -> Lang {
        value.and_then(Lang::parse).unwrap_or_default()
    }

    pub fn other(self) -> Lang {
        match self {
            Lang::Bn => Lang::En,
            Lang::En => Lang::Bn,
        }
    }

    /// Name of the language written in itself, for the toggle button.
    pub fn native_name(self) -> &'static str {
        match self {
            Lang::Bn => "বাংলা",
            Lang::En => "English",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lang::parse(s).ok_or_else(|| format!("unknown language `{s}` (expected bn or en)"))
    }
}

/// A piece of user-visible text: either a legacy plain string or a bilingual record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Text {
    Plain(String),
    Bilingual {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bn: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        en: Option<String>,
    },
}

impl Default for Text {
    fn default() -> Self {
        Text::Plain(String::new())
    }
}

impl Text {
    #[cfg(test)]
    pub fn bilingual(bn: &str, en: &str) -> Self {
        Text::Bilingual {
            bn: Some(bn.to_string()),
            en: Some(en.to_string()),
        }
    }
}

/// Project a text record onto a language.
///
/// Plain strings pass through untouched. Bilingual records try the requested
/// language, then Bengali, then English, then give up with an empty string.
/// Empty values are skipped like missing ones.
pub fn resolve(text: &Text, lang: Lang) -> &str {
    match text {
        Text::Plain(s) => s.as_str(),
        Text::Bilingual { bn, en } => {
            let requested = match lang {
                Lang::Bn => bn,
                Lang::En => en,
            };
            [requested, bn, en]
                .into_iter()
                .filter_map(|v| v.as_deref())
                .find(|v| !v.is_empty())
                .unwrap_or("")
        }
    }
}

/// Same as [`resolve`] for optional fields such as captions.
pub fn resolve_opt(text: Option<&Text>, lang: Lang) -> String {
    text.map(|t| resolve(t, lang).to_string()).unwrap_or_default()
}

const MONTHS_BN: [&str; 12] = [
    "জানুয়ারি",
    "ফেব্রুয়ারি",
    "মার্চ",
    "এপ্রিল",
    "মে",
    "জুন",
    "জুলাই",
    "আগস্ট",
    "সেপ্টেম্বর",
    "অক্টোবর",
    "নভেম্বর",
    "ডিসেম্বর",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Replace ASCII digits with Bengali digits (০-৯).
pub fn bengali_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x09E6 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// Long-form date for an ISO `YYYY-MM-DD` string (a trailing time part is ignored).
/// Unparsable input is returned as-is.
pub fn format_date(iso: &str, lang: Lang) -> String {
    let day_part = iso.get(..10).unwrap_or(iso);
    let Ok(date) = NaiveDate::parse_from_str(day_part, "%Y-%m-%d") else {
        return iso.to_string();
    };
    let month = date.month0() as usize;
    match lang {
        Lang::Bn => format!(
            "{} {} {}",
            bengali_digits(&date.day().to_string()),
            MONTHS_BN[month],
            bengali_digits(&date.year().to_string())
        ),
        Lang::En => format!("{} {}, {}", MONTHS_EN[month], date.day(), date.year()),
    }
}

/// Fixed UI strings of the gallery and achievements pages.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub gallery: &'static str,
    pub achievements: &'static str,
    pub all: &'static str,
    pub category: &'static str,
    pub year: &'static str,
    pub reset: &'static str,
    pub view: &'static str,
    pub back: &'static str,
    pub photos: &'static str,
    pub videos: &'static str,
    pub close: &'static str,
    pub previous: &'static str,
    pub next: &'static str,
    pub no_results: &'static str,
    pub no_results_hint: &'static str,
    pub no_data: &'static str,
    pub load_error: &'static str,
    pub load_error_hint: &'static str,
    pub not_found: &'static str,
}

impl Labels {
    pub fn for_lang(lang: Lang) -> Self {
        match lang {
            Lang::Bn => Labels {
                gallery: "গ্যালারি",
                achievements: "শারদ সম্মান",
                all: "সকল",
                category: "বিভাগ",
                year: "বছর",
                reset: "রিসেট",
                view: "দেখুন",
                back: "ফিরে যান",
                photos: "টি ছবি",
                videos: "টি ভিডিও",
                close: "বন্ধ করুন",
                previous: "পূর্ববর্তী",
                next: "পরবর্তী",
                no_results: "কোনো অ্যালবাম পাওয়া যায়নি",
                no_results_hint: "অন্য ফিল্টার চেষ্টা করুন",
                no_data: "কোনো তথ্য পাওয়া যায়নি",
                load_error: "গ্যালারি লোড করা যায়নি",
                load_error_hint: "অনুগ্রহ করে পৃষ্ঠাটি আবার লোড করুন",
                not_found: "অ্যালবামটি পাওয়া যায়নি",
            },
            Lang::En => Labels {
                gallery: "Gallery",
                achievements: "Achievements",
                all: "All",
                category: "Category",
                year: "Year",
                reset: "Reset",
                view: "View",
                back: "Back",
                photos: "Photos",
                videos: "Videos",
                close: "Close",
                previous: "Previous",
                next: "Next",
                no_results: "No albums found",
                no_results_hint: "Try a different filter",
                no_data: "No data found",
                load_error: "Error loading gallery",
                load_error_hint: "Please try refreshing the page",
                not_found: "Album not found",
            },
        }
    }
}
