use crate::db::DatabaseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde goes through the same string form so the database, the API and
/// the email function all agree on spelling.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Canceled => "canceled",
});

str_enum!(ServiceType {
    MensHaircut => "Men's Haircut",
    WomensHaircut => "Women's Haircut",
    BeardTrim => "Beard Trim",
    BeardShaping => "Beard Shaping",
    HotTowelShave => "Hot Towel Shave",
    HairColoring => "Hair Coloring",
    Highlights => "Highlights",
    HairTreatment => "Hair Treatment",
});

str_enum!(MessageKind {
    Confirmation => "confirmation",
    Reminder => "reminder",
    StatusChange => "status_change",
});

str_enum!(Role {
    Admin => "admin",
    Customer => "customer",
});

impl MessageKind {
    /// Kind of message sent when an appointment moves to `status`.
    pub fn for_status(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Confirmed => Self::Confirmation,
            _ => Self::StatusChange,
        }
    }
}
