//! Domain entities - Records stored in the world document
//!
//! Each entity kind has a typed record (the metadata supplied by the user plus
//! the `details` mapping filled in by generation) and an enum naming the
//! subcategories generated for it.

/// A generated subcategory of one family (physical world, culture, faction, ...)
pub trait Aspect: Copy + Send + Sync + 'static {
    /// Every subcategory, in generation order
    fn all() -> &'static [Self];

    /// Key the generated text is stored under
    fn key(&self) -> &'static str;

    /// Category name used for template lookup and error reporting
    fn category(&self) -> &'static str;
}

/// Declares a subcategory enum with its storage key and category name.
macro_rules! define_aspects {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($key:literal, $category:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl $crate::domain::entities::Aspect for $name {
            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            fn category(&self) -> &'static str {
                match self {
                    $($name::$variant => $category),+
                }
            }
        }
    };
}

mod artifact;
mod character;
mod event;
mod faction;
mod interaction;
mod location;
mod world;

pub use artifact::{ArtifactDetail, ArtifactRecord};
pub use character::{CharacterDetail, CharacterRecord};
pub use event::{EventDetail, EventRecord};
pub use faction::{FactionDetail, FactionRecord};
pub use interaction::InteractionRecord;
pub use location::{LocationDetail, LocationRecord};
pub use world::{CultureAspect, PhysicalAspect};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcategory_counts() {
        assert_eq!(PhysicalAspect::ALL.len(), 5);
        assert_eq!(CultureAspect::ALL.len(), 9);
        assert_eq!(FactionDetail::ALL.len(), 8);
        assert_eq!(CharacterDetail::ALL.len(), 7);
        assert_eq!(LocationDetail::ALL.len(), 8);
        assert_eq!(ArtifactDetail::ALL.len(), 6);
        assert_eq!(EventDetail::ALL.len(), 6);
    }

    #[test]
    fn test_keys_are_unique_within_family() {
        fn unique<A: Aspect>() -> bool {
            let keys: std::collections::HashSet<_> = A::all().iter().map(|a| a.key()).collect();
            keys.len() == A::all().len()
        }
        assert!(unique::<FactionDetail>());
        assert!(unique::<CharacterDetail>());
        assert!(unique::<LocationDetail>());
        assert!(unique::<ArtifactDetail>());
        assert!(unique::<EventDetail>());
    }

    #[test]
    fn test_categories_are_unique() {
        let mut categories: Vec<&str> = PhysicalAspect::ALL
            .iter()
            .map(|a| a.category())
            .chain(CultureAspect::ALL.iter().map(|a| a.category()))
            .chain(FactionDetail::ALL.iter().map(|a| a.category()))
            .chain(CharacterDetail::ALL.iter().map(|a| a.category()))
            .chain(LocationDetail::ALL.iter().map(|a| a.category()))
            .chain(ArtifactDetail::ALL.iter().map(|a| a.category()))
            .chain(EventDetail::ALL.iter().map(|a| a.category()))
            .collect();
        let total = categories.len();
        categories.sort_unstable();
        categories.dedup();
        assert_eq!(categories.len(), total);
    }
}
