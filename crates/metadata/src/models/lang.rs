//! Language codes as reported by metadata providers.
//!
//! Providers report BCP-47-ish codes (`"en"`, `"zh-Hans"`, `"pt-br"`). Only the
//! codes the library knows how to reason about are representable; anything
//! else is rejected at the provider boundary.

use crate::error::{Error, ErrorKind};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

macro_rules! languages {
    ($($variant:ident => $code:literal, $name:literal;)+) => {
        /// Language of a series, book or release.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Language {
            $(
                #[doc = $name]
                $variant,
            )+
        }
        impl Language {
            /// Every known language, in declaration order.
            pub const ALL: &'static [Language] = &[$(Language::$variant),+];

            /// Returns the provider code (e.g. `"en"`).
            pub fn as_code(&self) -> &'static str {
                match self {
                    $(Language::$variant => $code,)+
                }
            }

            /// Returns the English display name (e.g. `"English"`).
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Language::$variant => $name,)+
                }
            }
        }
    };
}

languages! {
    Ja => "ja", "Japanese";
    En => "en", "English";
    ZhHans => "zh-Hans", "Chinese (Simplified)";
    ZhHant => "zh-Hant", "Chinese (Traditional)";
    Fr => "fr", "French";
    Es => "es", "Spanish";
    Ko => "ko", "Korean";
    Ar => "ar", "Arabic";
    Bg => "bg", "Bulgarian";
    Ca => "ca", "Catalan";
    Cs => "cs", "Czech";
    Ck => "ck", "Chukchi";
    Da => "da", "Danish";
    De => "de", "German";
    El => "el", "Greek";
    Eo => "eo", "Esperanto";
    Eu => "eu", "Basque";
    Fa => "fa", "Persian";
    Fi => "fi", "Finnish";
    Ga => "ga", "Irish";
    Gd => "gd", "Scottish Gaelic";
    He => "he", "Hebrew";
    Hi => "hi", "Hindi";
    Hr => "hr", "Croatian";
    Hu => "hu", "Hungarian";
    Id => "id", "Indonesian";
    It => "it", "Italian";
    Iu => "iu", "Inuktitut";
    Mk => "mk", "Macedonian";
    Ms => "ms", "Malay";
    La => "la", "Latin";
    Lt => "lt", "Lithuanian";
    Lv => "lv", "Latvian";
    Nl => "nl", "Dutch";
    No => "no", "Norwegian";
    Pl => "pl", "Polish";
    PtPt => "pt-pt", "Portuguese (Portugal)";
    PtBr => "pt-br", "Portuguese (Brazil)";
    Ro => "ro", "Romanian";
    Ru => "ru", "Russian";
    Sk => "sk", "Slovak";
    Sl => "sl", "Slovenian";
    Sr => "sr", "Serbian";
    Sv => "sv", "Swedish";
    Ta => "ta", "Tamil";
    Th => "th", "Thai";
    Tr => "tr", "Turkish";
    Uk => "uk", "Ukrainian";
    Ur => "ur", "Urdu";
    Vi => "vi", "Vietnamese";
}

impl FromStr for Language {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Codes are matched case-insensitively ("zh-hans", "PT-BR").
        match Language::ALL.iter().find(|lang| lang.as_code().eq_ignore_ascii_case(trimmed)) {
            Some(lang) => Ok(*lang),
            None => exn::bail!(ErrorKind::ParseError {
                field: "language",
                value: s.to_string(),
            }),
        }
    }
}
impl TryFrom<String> for Language {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_code())
    }
}
impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(|_| D::Error::custom(format!("unknown language code: {code}")))
    }
}
