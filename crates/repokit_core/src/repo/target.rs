//! Target selectors for repository operations.
//!
//! A selector is normalized into an ordered collection before use. Its
//! associated `Output` type carries the singular/plural shape back out, so a
//! single key or record returns a single value and a sequence returns a
//! sequence.

use crate::model::record::{Record, RecordKey};
use crate::repo::error::{RepoError, RepoResult};

/// Keys accepted by `get`.
pub trait Lookup<M> {
    type Output;

    fn into_keys(self) -> Vec<RecordKey>;

    fn shape(found: Vec<M>) -> Self::Output;
}

/// Records accepted by `save`.
pub trait SaveTargets<M> {
    type Output;

    fn into_records(self) -> Vec<M>;

    fn shape(saved: Vec<M>) -> RepoResult<Self::Output>;
}

/// Keys or records accepted by `delete`.
pub trait DeleteTargets<M> {
    fn into_keys(self) -> RepoResult<Vec<RecordKey>>;
}

macro_rules! single_lookup {
    ($($ty:ty),* $(,)?) => {$(
        impl<M> Lookup<M> for $ty {
            type Output = Option<M>;

            fn into_keys(self) -> Vec<RecordKey> {
                vec![RecordKey::from(self)]
            }

            fn shape(found: Vec<M>) -> Self::Output {
                found.into_iter().next()
            }
        }

        impl<M: Record> DeleteTargets<M> for $ty {
            fn into_keys(self) -> RepoResult<Vec<RecordKey>> {
                Ok(vec![RecordKey::from(self)])
            }
        }
    )*};
}

single_lookup!(RecordKey, i64, String, &str);

impl<M, K: Clone + Into<RecordKey>> Lookup<M> for Vec<K> {
    type Output = Vec<M>;

    fn into_keys(self) -> Vec<RecordKey> {
        self.into_iter().map(Into::into).collect()
    }

    fn shape(found: Vec<M>) -> Self::Output {
        found
    }
}

impl<M, K: Clone + Into<RecordKey>> Lookup<M> for &[K] {
    type Output = Vec<M>;

    fn into_keys(self) -> Vec<RecordKey> {
        self.iter().cloned().map(Into::into).collect()
    }

    fn shape(found: Vec<M>) -> Self::Output {
        found
    }
}

impl<M, K: Into<RecordKey>, const N: usize> Lookup<M> for [K; N] {
    type Output = Vec<M>;

    fn into_keys(self) -> Vec<RecordKey> {
        self.into_iter().map(Into::into).collect()
    }

    fn shape(found: Vec<M>) -> Self::Output {
        found
    }
}

impl<M: Record> SaveTargets<M> for M {
    type Output = M;

    fn into_records(self) -> Vec<M> {
        vec![self]
    }

    fn shape(saved: Vec<M>) -> RepoResult<Self::Output> {
        saved.into_iter().next().ok_or_else(|| {
            RepoError::InvalidModel(format!("{} save produced no record", M::TABLE))
        })
    }
}

impl<M: Record> SaveTargets<M> for Vec<M> {
    type Output = Vec<M>;

    fn into_records(self) -> Vec<M> {
        self
    }

    fn shape(saved: Vec<M>) -> RepoResult<Self::Output> {
        Ok(saved)
    }
}

impl<M: Record> DeleteTargets<M> for &M {
    fn into_keys(self) -> RepoResult<Vec<RecordKey>> {
        Ok(vec![persisted_key(self)?])
    }
}

impl<M: Record> DeleteTargets<M> for &[M] {
    fn into_keys(self) -> RepoResult<Vec<RecordKey>> {
        self.iter().map(persisted_key).collect()
    }
}

impl<M: Record> DeleteTargets<M> for Vec<M> {
    fn into_keys(self) -> RepoResult<Vec<RecordKey>> {
        self.iter().map(persisted_key).collect()
    }
}

macro_rules! key_batch_delete {
    ($($ty:ty),* $(,)?) => {$(
        impl<M: Record> DeleteTargets<M> for Vec<$ty> {
            fn into_keys(self) -> RepoResult<Vec<RecordKey>> {
                Ok(self.into_iter().map(RecordKey::from).collect())
            }
        }

        impl<M: Record> DeleteTargets<M> for &[$ty] {
            fn into_keys(self) -> RepoResult<Vec<RecordKey>> {
                Ok(self.iter().cloned().map(RecordKey::from).collect())
            }
        }
    )*};
}

// Written out per key type: a blanket `Vec<K: Into<RecordKey>>` would overlap
// the record batch impls above.
key_batch_delete!(RecordKey, i64, String, &str);

impl<M: Record, K: Into<RecordKey>, const N: usize> DeleteTargets<M> for [K; N] {
    fn into_keys(self) -> RepoResult<Vec<RecordKey>> {
        Ok(self.into_iter().map(Into::into).collect())
    }
}

fn persisted_key<M: Record>(record: &M) -> RepoResult<RecordKey> {
    record.key().ok_or_else(|| {
        RepoError::InvalidModel(format!(
            "{} record has no key; it was never persisted",
            M::TABLE
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{DeleteTargets, Lookup, SaveTargets};
    use crate::model::field::{FieldError, FieldMap};
    use crate::model::record::{Record, RecordKey};
    use crate::repo::error::RepoError;

    #[derive(Debug, Clone, PartialEq)]
    struct Probe {
        id: Option<i64>,
    }

    impl Record for Probe {
        const TABLE: &'static str = "probes";
        const FILLABLE: &'static [&'static str] = &[];

        fn blank() -> Self {
            Self { id: None }
        }

        fn key(&self) -> Option<RecordKey> {
            self.id.map(RecordKey::Integer)
        }

        fn set_key(&mut self, key: RecordKey) {
            self.id = key.as_integer();
        }

        fn fill(&mut self, _fields: &FieldMap) -> Result<(), FieldError> {
            Ok(())
        }

        fn to_fields(&self) -> FieldMap {
            FieldMap::new()
        }
    }

    fn probe(id: i64) -> Probe {
        Probe { id: Some(id) }
    }

    #[test]
    fn single_key_lookup_yields_first_match() {
        let keys = <i64 as Lookup<Probe>>::into_keys(4);
        assert_eq!(keys, vec![RecordKey::Integer(4)]);

        let shaped = <i64 as Lookup<Probe>>::shape(vec![probe(4), probe(5)]);
        assert_eq!(shaped, Some(probe(4)));
        assert_eq!(<&str as Lookup<Probe>>::shape(Vec::new()), None);
    }

    #[test]
    fn sequence_lookup_keeps_every_match() {
        let keys = <[i64; 3] as Lookup<Probe>>::into_keys([3, 1, 2]);
        assert_eq!(
            keys,
            vec![
                RecordKey::Integer(3),
                RecordKey::Integer(1),
                RecordKey::Integer(2)
            ]
        );

        let shaped = <Vec<i64> as Lookup<Probe>>::shape(vec![probe(1)]);
        assert_eq!(shaped, vec![probe(1)]);
    }

    #[test]
    fn single_record_save_shape_is_singular() {
        let records = SaveTargets::<Probe>::into_records(probe(1));
        assert_eq!(records.len(), 1);

        let saved = <Probe as SaveTargets<Probe>>::shape(records).unwrap();
        assert_eq!(saved, probe(1));
    }

    #[test]
    fn delete_rejects_unpersisted_records() {
        let unsaved = Probe::blank();
        let err = DeleteTargets::<Probe>::into_keys(&unsaved).unwrap_err();
        assert!(matches!(err, RepoError::InvalidModel(message) if message.contains("probes")));

        let batch = vec![probe(1), Probe::blank()];
        assert!(DeleteTargets::<Probe>::into_keys(batch).is_err());
    }

    #[test]
    fn delete_accepts_keys_and_records() {
        let keys = DeleteTargets::<Probe>::into_keys(vec![1_i64, 2]).unwrap();
        assert_eq!(keys.len(), 2);

        let records = [probe(7), probe(8)];
        let keys = DeleteTargets::<Probe>::into_keys(&records[..]).unwrap();
        assert_eq!(keys, vec![RecordKey::Integer(7), RecordKey::Integer(8)]);
    }

    #[test]
    fn delete_accepts_text_key_batches() {
        let owned = vec!["a".to_string(), "b".to_string()];
        let keys = DeleteTargets::<Probe>::into_keys(owned.clone()).unwrap();
        assert_eq!(keys, vec![RecordKey::from("a"), RecordKey::from("b")]);

        let borrowed: &[String] = &owned;
        assert_eq!(DeleteTargets::<Probe>::into_keys(borrowed).unwrap().len(), 2);

        let keys = DeleteTargets::<Probe>::into_keys(vec!["x", "y"]).unwrap();
        assert_eq!(keys[1], RecordKey::Text("y".to_string()));

        let keys = DeleteTargets::<Probe>::into_keys(["p", "q", "r"]).unwrap();
        assert_eq!(keys.len(), 3);
    }
}
