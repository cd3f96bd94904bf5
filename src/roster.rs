//! In-memory student registry and the grade-based borrow limit table.

use crate::error::{CirculationError, Result};
use crate::student::Student;
use std::collections::HashMap;

/// Maximum concurrent outstanding loans for a grade.
///
/// Total over every integer: grades outside the table map to 0, meaning the
/// student may not borrow at all.
pub fn borrow_limit(grade: i32) -> u32 {
    match grade {
        8..=9 => 2,
        7 => 3,
        6 => 4,
        _ => 0,
    }
}

/// Students keyed by id, kept in registration order for listings.
#[derive(Debug, Default, Clone)]
pub struct Roster {
    students: Vec<Student>,
    index: HashMap<u32, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a student. Ids must be unique.
    pub fn register(&mut self, student: Student) -> Result<()> {
        if self.index.contains_key(&student.id) {
            return Err(CirculationError::DuplicateStudent(student.id));
        }

        self.index.insert(student.id, self.students.len());
        self.students.push(student);
        Ok(())
    }

    pub fn find_student(&self, id: u32) -> Option<&Student> {
        self.index.get(&id).and_then(|&pos| self.students.get(pos))
    }

    pub(crate) fn find_student_mut(&mut self, id: u32) -> Option<&mut Student> {
        let pos = *self.index.get(&id)?;
        self.students.get_mut(pos)
    }

    pub(crate) fn students_mut(&mut self) -> impl Iterator<Item = &mut Student> {
        self.students.iter_mut()
    }

    /// All students in registration order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
