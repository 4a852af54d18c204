// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ops::Deref, sync::Arc};

/// A vector that shares its buffer between clones until one of them writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CowVec<T>
where
	T: Clone,
{
	inner: Arc<Vec<T>>,
}

impl<T> CowVec<T>
where
	T: Clone,
{
	pub fn new(vec: Vec<T>) -> Self {
		Self {
			inner: Arc::new(vec),
		}
	}

	pub fn is_shared(&self) -> bool {
		Arc::strong_count(&self.inner) > 1
	}

	/// Ensures unique ownership and returns a mutable reference to the inner Vec.
	pub fn make_mut(&mut self) -> &mut Vec<T> {
		Arc::make_mut(&mut self.inner)
	}

	pub fn as_slice(&self) -> &[T] {
		self.inner.as_slice()
	}

	pub fn get(&self, idx: usize) -> Option<&T> {
		self.inner.get(idx)
	}

	pub fn insert(&mut self, idx: usize, value: T) {
		self.make_mut().insert(idx, value);
	}

	pub fn remove(&mut self, idx: usize) -> T {
		self.make_mut().remove(idx)
	}

	pub fn push(&mut self, value: T) {
		self.make_mut().push(value);
	}

	/// Moves the element at `from` to `to`, shifting everything in between by one.
	pub fn relocate(&mut self, from: usize, to: usize) {
		let vec = self.make_mut();
		if from < to {
			vec[from..=to].rotate_left(1);
		} else if to < from {
			vec[to..=from].rotate_right(1);
		}
	}
}

impl<T> Default for CowVec<T>
where
	T: Clone,
{
	fn default() -> Self {
		Self::new(Vec::new())
	}
}

impl<T> Deref for CowVec<T>
where
	T: Clone,
{
	type Target = [T];

	fn deref(&self) -> &Self::Target {
		self.as_slice()
	}
}

impl<T> From<Vec<T>> for CowVec<T>
where
	T: Clone,
{
	fn from(vec: Vec<T>) -> Self {
		Self::new(vec)
	}
}

impl<T> IntoIterator for CowVec<T>
where
	T: Clone,
{
	type Item = T;
	type IntoIter = std::vec::IntoIter<Self::Item>;

	fn into_iter(self) -> Self::IntoIter {
		Arc::unwrap_or_clone(self.inner).into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clone_shares_until_write() {
		let mut a = CowVec::new(vec![1, 2, 3]);
		let b = a.clone();
		assert!(a.is_shared());

		a.push(4);
		assert!(!a.is_shared());
		assert_eq!(a.as_slice(), &[1, 2, 3, 4]);
		assert_eq!(b.as_slice(), &[1, 2, 3]);
	}

	#[test]
	fn relocate_forward() {
		let mut v = CowVec::new(vec!['a', 'b', 'c', 'd', 'e']);
		v.relocate(1, 3);
		assert_eq!(v.as_slice(), &['a', 'c', 'd', 'b', 'e']);
	}

	#[test]
	fn relocate_backward() {
		let mut v = CowVec::new(vec!['a', 'b', 'c', 'd', 'e']);
		v.relocate(4, 0);
		assert_eq!(v.as_slice(), &['e', 'a', 'b', 'c', 'd']);
	}

	#[test]
	fn relocate_same_position_is_noop() {
		let mut v = CowVec::new(vec![1, 2, 3]);
		v.relocate(1, 1);
		assert_eq!(v.as_slice(), &[1, 2, 3]);
	}

	#[test]
	fn insert_and_remove() {
		let mut v = CowVec::new(vec![10, 30]);
		v.insert(1, 20);
		assert_eq!(v.as_slice(), &[10, 20, 30]);
		assert_eq!(v.remove(0), 10);
		assert_eq!(v.as_slice(), &[20, 30]);
	}
}
