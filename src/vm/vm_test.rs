// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::VmState;
use crate::object::Obj;

#[test]
fn copy_string_interns_equal_content_once() {
    let mut vm = VmState::new();
    let a = vm.copy_string("shared");
    let b = vm.copy_string("shared");

    assert!(Obj::ptr_eq(&a, &b));
    assert_eq!(vm.interned_count(), 1);
}

#[test]
fn copy_string_distinguishes_different_content() {
    let mut vm = VmState::new();
    let a = vm.copy_string("one");
    let b = vm.copy_string("two");

    assert!(!Obj::ptr_eq(&a, &b));
    assert_eq!(vm.interned_count(), 2);
}

#[test]
fn take_string_reuses_existing_interned_object() {
    let mut vm = VmState::new();
    let a = vm.copy_string("owned");
    let taken: std::boxed::Box<[u8]> = b"owned".to_vec().into_boxed_slice();
    let b = vm.take_string(taken);

    assert!(Obj::ptr_eq(&a, &b));
    assert_eq!(vm.interned_count(), 1);
}

#[test]
fn take_string_allocates_when_no_match_exists() {
    let mut vm = VmState::new();
    let taken: std::boxed::Box<[u8]> = b"fresh".to_vec().into_boxed_slice();
    let obj = vm.take_string(taken);

    assert_eq!(obj.as_str(), Some("fresh"));
    assert_eq!(vm.interned_count(), 1);
}

#[test]
fn interned_objects_are_linked_into_the_object_list() {
    let mut vm = VmState::new();
    vm.copy_string("first");
    vm.copy_string("second");

    let head = vm.objects().expect("at least one object allocated");
    assert_eq!(head.as_str(), Some("second"));
    let next = head.next().expect("first string still linked");
    assert_eq!(next.as_str(), Some("first"));
}
