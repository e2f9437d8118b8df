//! Deferred, cached field values.
//!
//! The domain model does not decode every field of every block when a stack
//! is opened. Each field is a [`LazyField`] holding either a producer or the
//! decoded value. The producer runs on first access and is dropped once it
//! succeeds; a failing producer is kept so the next access retries and
//! reports the error again.
//!
//! Derived fields keep their producer as a recomputation edge. When a source
//! field is [`set`](LazyField::set), every registered dependent is recomputed
//! synchronously, in registration order. Dependents are held weakly and
//! vanish from the list once dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::error::{Error, Result};

type Producer<T> = Box<dyn Fn() -> Result<T>>;

enum State<T> {
    Pending(Producer<T>),
    Evaluating,
    Ready(T),
}

/// Something that must react when a field it was computed from changes.
pub trait Dependent {
    /// Drop any cached value and recompute it if possible.
    fn invalidate(&self);
}

/// A cell computing its value on first access.
pub struct LazyField<T> {
    state: RefCell<State<T>>,
    recompute: Option<Rc<dyn Fn() -> Result<T>>>,
    dependents: RefCell<Vec<Weak<dyn Dependent>>>,
}

impl<T> LazyField<T> {
    /// A field whose value is already known.
    pub fn ready(value: T) -> Self {
        Self {
            state: RefCell::new(State::Ready(value)),
            recompute: None,
            dependents: RefCell::new(Vec::new()),
        }
    }

    /// A field computed by `producer` on first access.
    pub fn new(producer: impl Fn() -> Result<T> + 'static) -> Self {
        Self {
            state: RefCell::new(State::Pending(Box::new(producer))),
            recompute: None,
            dependents: RefCell::new(Vec::new()),
        }
    }

    /// A field computed from other fields, recomputed whenever a source it
    /// was registered on changes.
    pub fn derived(producer: impl Fn() -> Result<T> + 'static) -> Self
    where
        T: 'static,
    {
        let producer: Rc<dyn Fn() -> Result<T>> = Rc::new(producer);
        let first = Rc::clone(&producer);
        Self {
            state: RefCell::new(State::Pending(Box::new(move || first()))),
            recompute: Some(producer),
            dependents: RefCell::new(Vec::new()),
        }
    }

    /// Whether the value has been computed.
    pub fn is_ready(&self) -> bool {
        matches!(self.state.try_borrow().as_deref(), Ok(State::Ready(_)))
    }

    /// Run `f` on the value, computing it first if needed.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.force()?;
        let state = self
            .state
            .try_borrow()
            .map_err(|_| Error::RecursiveEvaluation)?;
        match &*state {
            State::Ready(value) => Ok(f(value)),
            _ => Err(Error::RecursiveEvaluation),
        }
    }

    /// Replace the value and recompute the dependents.
    ///
    /// The pending producer, if any, is dropped without running.
    pub fn set(&self, value: T) -> Result<()> {
        *self
            .state
            .try_borrow_mut()
            .map_err(|_| Error::RecursiveEvaluation)? = State::Ready(value);
        self.notify();
        Ok(())
    }

    /// Register a field to recompute when this one changes.
    pub fn add_dependent(&self, dependent: Weak<dyn Dependent>) {
        self.dependents.borrow_mut().push(dependent);
    }

    /// Number of dependents still alive.
    pub fn dependent_count(&self) -> usize {
        self.dependents
            .borrow()
            .iter()
            .filter(|d| d.strong_count() > 0)
            .count()
    }

    fn force(&self) -> Result<()> {
        let producer = {
            let mut state = self
                .state
                .try_borrow_mut()
                .map_err(|_| Error::RecursiveEvaluation)?;
            match std::mem::replace(&mut *state, State::Evaluating) {
                State::Pending(producer) => producer,
                State::Evaluating => return Err(Error::RecursiveEvaluation),
                ready @ State::Ready(_) => {
                    *state = ready;
                    return Ok(());
                },
            }
        };

        let result = producer();

        let mut state = self
            .state
            .try_borrow_mut()
            .map_err(|_| Error::RecursiveEvaluation)?;
        // A set() during evaluation wins over the produced value
        if !matches!(*state, State::Evaluating) {
            return Ok(());
        }
        match result {
            Ok(value) => {
                *state = State::Ready(value);
                drop(producer);
                Ok(())
            },
            Err(err) => {
                *state = State::Pending(producer);
                Err(err)
            },
        }
    }

    fn notify(&self) {
        let alive: Vec<Rc<dyn Dependent>> = {
            let mut dependents = self.dependents.borrow_mut();
            dependents.retain(|d| d.strong_count() > 0);
            dependents.iter().filter_map(Weak::upgrade).collect()
        };
        for dependent in alive {
            dependent.invalidate();
        }
    }
}

impl<T: Clone> LazyField<T> {
    /// The value, computing it first if needed.
    pub fn get(&self) -> Result<T> {
        self.with(T::clone)
    }
}

impl<T: 'static> LazyField<T> {
    /// Register `this` as a dependent of `source`.
    pub fn depends_on<U>(this: &Rc<Self>, source: &LazyField<U>) {
        let weak: Weak<dyn Dependent> = Rc::downgrade(this) as Weak<dyn Dependent>;
        source.add_dependent(weak);
    }
}

impl<T: 'static> Dependent for LazyField<T> {
    fn invalidate(&self) {
        if let Some(recompute) = &self.recompute {
            let recompute = Rc::clone(recompute);
            if let Ok(mut state) = self.state.try_borrow_mut() {
                *state = State::Pending(Box::new(move || recompute()));
            }
            if let Err(err) = self.force() {
                log::debug!("Recomputing a derived field failed: {err}");
            }
        }
        self.notify();
    }
}

impl<T> From<T> for LazyField<T> {
    fn from(value: T) -> Self {
        LazyField::ready(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow().as_deref() {
            Ok(State::Ready(value)) => f.debug_tuple("LazyField").field(value).finish(),
            Ok(State::Pending(_)) => f.write_str("LazyField(<pending>)"),
            _ => f.write_str("LazyField(<evaluating>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_producer_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let field = LazyField::new(move || {
            counter.set(counter.get() + 1);
            Ok(42)
        });

        assert!(!field.is_ready());
        assert_eq!(field.get().unwrap(), 42);
        assert_eq!(field.get().unwrap(), 42);
        assert_eq!(calls.get(), 1);
        assert!(field.is_ready());
    }

    #[test]
    fn test_set_skips_producer() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let field = LazyField::new(move || {
            counter.set(counter.get() + 1);
            Ok(String::from("decoded"))
        });

        field.set(String::from("edited")).unwrap();
        assert_eq!(field.get().unwrap(), "edited");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_failed_producer_retries() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let field: LazyField<u32> = LazyField::new(move || {
            counter.set(counter.get() + 1);
            Err(Error::CorruptedFile("bad block".to_string()))
        });

        assert!(field.get().is_err());
        assert!(field.get().is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_recursive_evaluation() {
        let field: Rc<LazyField<u32>> = Rc::new_cyclic(|weak: &Weak<LazyField<u32>>| {
            let weak = weak.clone();
            LazyField::new(move || match weak.upgrade() {
                Some(me) => me.get().map(|v| v + 1),
                None => Ok(0),
            })
        });
        assert_eq!(field.get(), Err(Error::RecursiveEvaluation));
        // The cell is usable again once the cycle is broken
        field.set(7).unwrap();
        assert_eq!(field.get().unwrap(), 7);
    }

    #[test]
    fn test_dependents_recompute_in_order() {
        let source = Rc::new(LazyField::ready(2));
        let order = Rc::new(RefCell::new(Vec::new()));

        let doubled = {
            let (source, order) = (Rc::clone(&source), Rc::clone(&order));
            Rc::new(LazyField::derived(move || {
                order.borrow_mut().push("doubled");
                source.get().map(|v| v * 2)
            }))
        };
        let squared = {
            let (source, order) = (Rc::clone(&source), Rc::clone(&order));
            Rc::new(LazyField::derived(move || {
                order.borrow_mut().push("squared");
                source.get().map(|v| v * v)
            }))
        };
        LazyField::depends_on(&doubled, &*source);
        LazyField::depends_on(&squared, &*source);

        assert_eq!(doubled.get().unwrap(), 4);
        assert_eq!(squared.get().unwrap(), 4);
        order.borrow_mut().clear();

        source.set(5).unwrap();
        assert_eq!(*order.borrow(), vec!["doubled", "squared"]);
        assert_eq!(doubled.get().unwrap(), 10);
        assert_eq!(squared.get().unwrap(), 25);
    }

    #[test]
    fn test_dropped_dependent_is_pruned() {
        let source = LazyField::ready(1);
        {
            let dependent = Rc::new(LazyField::derived(|| Ok(0)));
            LazyField::depends_on(&dependent, &source);
            assert_eq!(source.dependent_count(), 1);
        }
        assert_eq!(source.dependent_count(), 0);
        source.set(2).unwrap();
        assert_eq!(source.get().unwrap(), 2);
    }
}
