use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

#[rstest]
#[case("Admin", "Admin")]
#[case("::Admin::UserService", "Admin::UserService")]
#[case("Object::Admin", "Admin")]
#[case("Object::Object::M", "M")]
#[case("Object", "Object")]
#[case("V2_Api", "V2_Api")]
fn parse_normalizes(#[case] input: &str, #[case] expected: &str) {
	assert_eq!(QualifiedName::parse(input).unwrap().as_str(), expected);
}

#[rstest]
#[case("")]
#[case("::")]
#[case("admin")]
#[case("Admin::")]
#[case("Admin::user")]
#[case("Admin:::User")]
#[case("Ad-min")]
fn parse_rejects(#[case] input: &str) {
	assert!(QualifiedName::parse(input).is_err(), "{input:?} should not parse");
}

#[test]
fn parse_reports_offending_segment() {
	let err = QualifiedName::parse("Admin::user_service").unwrap_err();
	assert_eq!(
		err,
		NameError::InvalidSegment {
			input: "Admin::user_service".into(),
			segment: "user_service".into(),
		}
	);
}

#[test]
fn parent_and_last() {
	let name = QualifiedName::parse("A::B::C").unwrap();
	assert_eq!(name.last(), "C");
	assert_eq!(name.depth(), 3);

	let parent = name.parent().unwrap();
	assert_eq!(parent.as_str(), "A::B");
	assert_eq!(parent.parent().unwrap().as_str(), "A");
	assert!(parent.parent().unwrap().parent().is_none());
}

#[test]
fn join_validates_segment() {
	let admin = QualifiedName::parse("Admin").unwrap();
	assert_eq!(admin.join("Users").unwrap().as_str(), "Admin::Users");
	assert!(admin.join("users").is_err());
	assert!(admin.join("A::B").is_err());
}

#[rstest]
#[case("UserService", "user_service")]
#[case("Admin::UserService", "admin/user_service")]
#[case("HTMLParser", "html_parser")]
#[case("M", "m")]
fn underscore(#[case] name: &str, #[case] suffix: &str) {
	assert_eq!(QualifiedName::parse(name).unwrap().underscore(), suffix);
}

#[test]
fn qualify_top_level_requires_single_segment() {
	assert_eq!(qualify(None, "M").unwrap().as_str(), "M");
	assert!(qualify(None, "A::B").is_err());

	let scope = QualifiedName::parse("Admin").unwrap();
	assert_eq!(qualify(Some(&scope), "M").unwrap().as_str(), "Admin::M");
}

#[test]
fn borrow_lookup_by_str() {
	let mut set = std::collections::HashSet::new();
	set.insert(QualifiedName::parse("Admin::M").unwrap());
	assert!(set.contains("Admin::M"));
}
