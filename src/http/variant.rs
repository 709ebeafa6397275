use strum::{Display, EnumString, IntoStaticStr};

/// Selects between the two observed behaviours of the response builder.
///
/// | | `Current` | `Legacy` |
/// |---|---|---|
/// | JSON media type | `application/json` | `application/vnd.api+json` |
/// | body after reset | `""` | unset (`None`) |
/// | body written when | non-empty | set |
/// | state after send | kept | reset |
#[derive(EnumString, IntoStaticStr, Debug, PartialEq, Eq, Clone, Copy, Display, Default)]
pub enum Variant {
    #[default]
    #[strum(serialize = "current")]
    Current,
    #[strum(serialize = "legacy")]
    Legacy,
}

impl Variant {
    pub fn json_content_type(self) -> &'static str {
        match self {
            Variant::Current => "application/json",
            Variant::Legacy => "application/vnd.api+json",
        }
    }

    pub(crate) fn empty_body(self) -> Option<String> {
        match self {
            Variant::Current => Some(String::new()),
            Variant::Legacy => None,
        }
    }

    pub(crate) fn should_write_body(self, body: Option<&str>) -> bool {
        match self {
            Variant::Current => body.is_some_and(|b| !b.is_empty()),
            Variant::Legacy => body.is_some(),
        }
    }

    pub(crate) fn resets_after_send(self) -> bool {
        matches!(self, Variant::Legacy)
    }
}
