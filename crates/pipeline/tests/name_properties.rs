// Property tests for image-name normalization.
// Run with: cargo test -p qpcollate-pipeline --test name_properties

use proptest::prelude::*;
use qpcollate_pipeline::NameRule;

proptest! {
    #[test]
    fn scanner_names_reduce_to_code_and_condition(
        date in "[0-9]{4}\\.[0-9]{2}\\.[0-9]{2}",
        code in "[A-Z]{2}[0-9]{6}",
        slide in "[0-9]{2}",
        stain in "[A-Za-z0-9]{1,6}",
        condition in "[A-Za-z0-9 -]{1,12}",
    ) {
        let name = format!("{date}-{code}_{slide}_{stain}_{condition}.ndpi");
        let expected = format!("{code}_{condition}");
        prop_assert_eq!(NameRule::new(false).normalize(&name), expected.as_str());
        prop_assert_eq!(NameRule::new(true).normalize(&name), expected.as_str());
    }

    #[test]
    fn names_without_dash_are_unchanged(name in "[A-Za-z0-9_. ]{0,40}") {
        prop_assert_eq!(NameRule::default().normalize(&name), name.as_str());
    }

    #[test]
    fn normalization_is_idempotent(
        code in "[A-Z]{2}[0-9]{6}",
        condition in "[A-Za-z0-9]{1,12}",
    ) {
        let rule = NameRule::default();
        let name = format!("2023.01.01-{code}_01_HE_{condition}.ndpi");
        let once = rule.normalize(&name).into_owned();
        let twice = rule.normalize(&once).into_owned();
        prop_assert_eq!(once, twice);
    }
}
