//! The `Uniquepair` record (spec §3, §4.9): a generic `(domain, first_elem,
//! second_elem)` unique tuple backing Follow and Like.

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniquepair {
    pub id: i32,
    pub created_at: i32,
    pub domain: String,
    pub first_elem: i32,
    pub second_elem: i32,
}

impl Message for Uniquepair {
    fn encode(&self, w: &mut Writer) {
        w.write_i32_field(1, self.id);
        w.write_i32_field(2, self.created_at);
        w.write_string_field(3, &self.domain);
        w.write_i32_field(4, self.first_elem);
        w.write_i32_field(5, self.second_elem);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut id = None;
        let mut created_at = None;
        let mut domain = None;
        let mut first_elem = None;
        let mut second_elem = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => id = Some(r.read_i32()?),
                2 => created_at = Some(r.read_i32()?),
                3 => domain = Some(r.read_string()?),
                4 => first_elem = Some(r.read_i32()?),
                5 => second_elem = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(Uniquepair {
            id: id.ok_or(CodecError::MissingField(1, "id"))?,
            created_at: created_at.ok_or(CodecError::MissingField(2, "created_at"))?,
            domain: domain.ok_or(CodecError::MissingField(3, "domain"))?,
            first_elem: first_elem.ok_or(CodecError::MissingField(4, "first_elem"))?,
            second_elem: second_elem.ok_or(CodecError::MissingField(5, "second_elem"))?,
        })
    }
}

/// The `fetch`/`count` filter (spec §4.9): `domain` is always pinned, the two
/// elements are optional equality filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniquepairQuery {
    pub domain: String,
    pub first_elem: Option<i32>,
    pub second_elem: Option<i32>,
}

impl Message for UniquepairQuery {
    fn encode(&self, w: &mut Writer) {
        w.write_string_field(1, &self.domain);
        if let Some(v) = self.first_elem {
            w.write_i32_field(2, v);
        }
        if let Some(v) = self.second_elem {
            w.write_i32_field(3, v);
        }
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut domain = None;
        let mut first_elem = None;
        let mut second_elem = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => domain = Some(r.read_string()?),
                2 => first_elem = Some(r.read_i32()?),
                3 => second_elem = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(UniquepairQuery {
            domain: domain.ok_or(CodecError::MissingField(1, "domain"))?,
            first_elem,
            second_elem,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniquepair_round_trips() {
        let pair = Uniquepair {
            id: 7,
            created_at: 1_700_000_000,
            domain: "follow".to_string(),
            first_elem: 1,
            second_elem: 2,
        };
        let decoded = Uniquepair::from_bytes(&pair.to_bytes()).unwrap();
        assert_eq!(decoded, pair);
    }

    #[test]
    fn query_omits_absent_optional_fields() {
        let query = UniquepairQuery {
            domain: "like".to_string(),
            first_elem: Some(3),
            second_elem: None,
        };
        let decoded = UniquepairQuery::from_bytes(&query.to_bytes()).unwrap();
        assert_eq!(decoded.first_elem, Some(3));
        assert_eq!(decoded.second_elem, None);
    }
}
