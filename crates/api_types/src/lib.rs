use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    /// Request body for `POST /user`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
        pub name: String,
    }

    /// Request body for `POST /user/authenticate`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub username: String,
        pub password: String,
    }

    /// The user object as the server returns it.
    ///
    /// The server echoes more fields than we care about; everything beyond
    /// the identifying pair is ignored on decode.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        #[serde(default)]
        pub name: String,
    }
}

pub mod expense {
    use super::*;

    /// The six expense categories the entry form offers.
    ///
    /// The wire keeps `type` as a plain string: the read path must not
    /// reject records whose category it does not recognize.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum ExpenseType {
        Food,
        Transport,
        Shopping,
        Entertainment,
        Accommodation,
        Misc,
    }

    impl ExpenseType {
        pub const ALL: [ExpenseType; 6] = [
            Self::Food,
            Self::Transport,
            Self::Shopping,
            Self::Entertainment,
            Self::Accommodation,
            Self::Misc,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Food => "Food",
                Self::Transport => "Transport",
                Self::Shopping => "Shopping",
                Self::Entertainment => "Entertainment",
                Self::Accommodation => "Accommodation",
                Self::Misc => "Misc",
            }
        }
    }

    /// A group member referenced by an expense (wire shape `{"memberName": ..}`).
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SharedMember {
        pub member_name: String,
    }

    impl From<&str> for SharedMember {
        fn from(name: &str) -> Self {
            Self {
                member_name: name.to_string(),
            }
        }
    }

    /// An expense record as stored by the remote service.
    ///
    /// `id` is assigned server-side; the client never fabricates one.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Expense {
        pub id: i64,
        #[serde(rename = "type")]
        pub kind: String,
        pub amount: f64,
        pub description: String,
        pub paid_by: String,
        #[serde(default)]
        pub shared_by: Vec<SharedMember>,
    }

    /// Candidate body for `POST /expense/{username}/add`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseNew {
        #[serde(rename = "type")]
        pub kind: String,
        pub amount: f64,
        pub description: String,
        pub paid_by: String,
        pub shared_by: Vec<SharedMember>,
    }

    /// Partial body for `PUT /expense/{id}`. Absent fields are left as-is.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseUpdate {
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub kind: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub amount: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub paid_by: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub shared_by: Option<Vec<SharedMember>>,
    }
}

pub mod dashboard {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    /// Settlement plan: payer name to already-formatted transaction lines.
    ///
    /// The server emits a canonical ordering and the client must render it
    /// as-is, so this decodes into an ordered entry list instead of a map
    /// type that would shuffle keys.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Settlement {
        pub entries: Vec<(String, Vec<String>)>,
    }

    impl<'de> Deserialize<'de> for Settlement {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct SettlementVisitor;

            impl<'de> Visitor<'de> for SettlementVisitor {
                type Value = Settlement;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a map of payer to transaction lines")
                }

                fn visit_map<A>(self, mut map: A) -> Result<Settlement, A::Error>
                where
                    A: MapAccess<'de>,
                {
                    let mut entries = Vec::new();
                    while let Some((payer, lines)) = map.next_entry::<String, Vec<String>>()? {
                        entries.push((payer, lines));
                    }
                    Ok(Settlement { entries })
                }
            }

            deserializer.deserialize_map(SettlementVisitor)
        }
    }

    impl Serialize for Settlement {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut map = serializer.serialize_map(Some(self.entries.len()))?;
            for (payer, lines) in &self.entries {
                map.serialize_entry(payer, lines)?;
            }
            map.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::dashboard::Settlement;
    use super::expense::Expense;

    #[test]
    fn expense_decodes_server_shape() {
        let body = r#"{
            "id": 7,
            "type": "Food",
            "amount": 30.0,
            "description": "lunch",
            "paidBy": "alice",
            "sharedBy": [{"memberName": "bob"}, {"memberName": "carol"}]
        }"#;
        let expense: Expense = serde_json::from_str(body).unwrap();
        assert_eq!(expense.id, 7);
        assert_eq!(expense.kind, "Food");
        assert_eq!(expense.paid_by, "alice");
        let names: Vec<&str> = expense
            .shared_by
            .iter()
            .map(|m| m.member_name.as_str())
            .collect();
        assert_eq!(names, ["bob", "carol"]);
    }

    #[test]
    fn expense_tolerates_unknown_type() {
        let body = r#"{"id": 1, "type": "Gadgets", "amount": 5.5,
                       "description": "x", "paidBy": "a", "sharedBy": []}"#;
        let expense: Expense = serde_json::from_str(body).unwrap();
        assert_eq!(expense.kind, "Gadgets");
    }

    #[test]
    fn settlement_preserves_document_order() {
        // Keys deliberately not alphabetical.
        let body = r#"{"Zed": ["owes Ann $1"], "Ann": ["owes Zed $2", "owes Bob $3"]}"#;
        let settlement: Settlement = serde_json::from_str(body).unwrap();
        assert_eq!(settlement.entries[0].0, "Zed");
        assert_eq!(settlement.entries[1].0, "Ann");
        assert_eq!(settlement.entries[1].1.len(), 2);
    }

    #[test]
    fn settlement_roundtrips_in_order() {
        let body = r#"{"Carol":["owes Bob $3"],"Alice":["owes Bob $5"]}"#;
        let settlement: Settlement = serde_json::from_str(body).unwrap();
        assert_eq!(serde_json::to_string(&settlement).unwrap(), body);
    }
}
