//! Testing utilities for the literal workspace
//!
//! Sample semantic types, a pre-populated registry, and helpers to build
//! literals from plain Rust values.

#![allow(missing_docs)]

use lit_literal::{Literal, Quantifier, SimpleLiteral};
use lit_types::{
    ChangeError, ChangeMode, Changer, Converter, FnSerializer, Registry, SerdeSerializer,
    StringMode, TypeInfo, TypeTag, Value,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Abstract supertype of [`Integer`]; never held as a value
#[derive(Debug)]
pub struct Number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integer(pub i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

/// Element mutated in place by its changer
#[derive(Debug, Default)]
pub struct Counter {
    count: Mutex<i64>,
}

impl Counter {
    pub fn new(count: i64) -> Self {
        Self {
            count: Mutex::new(count),
        }
    }

    pub fn get(&self) -> i64 {
        *self.count.lock()
    }
}

fn integer_delta(delta: &[Value]) -> Result<i64, ChangeError> {
    match delta {
        [only] => only.downcast_ref::<Integer>().map(|i| i.0).ok_or_else(|| {
            ChangeError::InvalidDelta(format!("expected an integer, got {}", only.tag()))
        }),
        _ => Err(ChangeError::InvalidDelta(format!(
            "expected one integer, got {}",
            delta.len()
        ))),
    }
}

/// Changer registered on [`Number`], inherited by [`Integer`]
///
/// Replaces each element with a new [`Integer`].
#[derive(Debug)]
pub struct NumberChanger;

impl Changer for NumberChanger {
    fn accept_change(&self, mode: ChangeMode) -> Option<Vec<TypeTag>> {
        match mode {
            ChangeMode::Add | ChangeMode::Remove | ChangeMode::Set => {
                Some(vec![TypeTag::of::<Integer>()])
            }
            ChangeMode::Reset => Some(Vec::new()),
            ChangeMode::RemoveAll | ChangeMode::Delete => None,
        }
    }

    fn change(
        &self,
        elements: &mut [Value],
        delta: &[Value],
        mode: ChangeMode,
    ) -> Result<(), ChangeError> {
        let by = if mode.takes_delta() { integer_delta(delta)? } else { 0 };
        for element in elements.iter_mut() {
            let current = element
                .downcast_ref::<Integer>()
                .ok_or(ChangeError::WrongElementType {
                    expected: TypeTag::of::<Integer>(),
                    actual: element.tag(),
                })?
                .0;
            let next = match mode {
                ChangeMode::Add => current.checked_add(by),
                ChangeMode::Remove => current.checked_sub(by),
                ChangeMode::Set => Some(by),
                ChangeMode::Reset => Some(0),
                ChangeMode::RemoveAll | ChangeMode::Delete => {
                    return Err(ChangeError::UnsupportedMode(mode))
                }
            }
            .ok_or_else(|| ChangeError::Failed(format!("integer overflow changing {current}")))?;
            *element = Value::new(Integer(next));
        }
        Ok(())
    }
}

/// Changer for [`Counter`]; mutates the shared elements in place
#[derive(Debug)]
pub struct CounterChanger;

impl Changer for CounterChanger {
    fn accept_change(&self, mode: ChangeMode) -> Option<Vec<TypeTag>> {
        match mode {
            ChangeMode::Add | ChangeMode::Remove | ChangeMode::Set => {
                Some(vec![TypeTag::of::<Integer>()])
            }
            ChangeMode::Reset => Some(Vec::new()),
            ChangeMode::RemoveAll | ChangeMode::Delete => None,
        }
    }

    fn change(
        &self,
        elements: &mut [Value],
        delta: &[Value],
        mode: ChangeMode,
    ) -> Result<(), ChangeError> {
        let by = if mode.takes_delta() { integer_delta(delta)? } else { 0 };
        for element in elements.iter() {
            let counter = element.downcast_ref::<Counter>().ok_or(ChangeError::WrongElementType {
                expected: TypeTag::of::<Counter>(),
                actual: element.tag(),
            })?;
            let mut count = counter.count.lock();
            match mode {
                ChangeMode::Add => *count += by,
                ChangeMode::Remove => *count -= by,
                ChangeMode::Set => *count = by,
                ChangeMode::Reset => *count = 0,
                ChangeMode::RemoveAll | ChangeMode::Delete => {
                    return Err(ChangeError::UnsupportedMode(mode))
                }
            }
        }
        Ok(())
    }
}

fn render_text(text: &Text, mode: StringMode) -> String {
    match mode {
        StringMode::Debug => format!("{:?}", text.0),
        StringMode::Message | StringMode::VariableName => text.0.clone(),
    }
}

/// Registry with the sample types
///
/// - `number`: [`Number`], abstract, carries [`NumberChanger`]
/// - `integer`: [`Integer`], a `number`, serde-serialized
/// - `text`: [`Text`], no changer
/// - `counter`: [`Counter`], changed in place
/// - converters `integer -> text` and `text -> integer` (declines non-numeric text)
pub fn test_registry() -> Arc<Registry> {
    Registry::builder()
        .register_type(
            TypeInfo::new::<Number>("number")
                .with_user_name("number")
                .with_changer(NumberChanger),
        )
        .register_type(
            TypeInfo::new::<Integer>("integer")
                .with_user_name("integer")
                .with_supertype(TypeTag::of::<Number>())
                .with_renderer(|i: &Integer, _| i.0.to_string())
                .with_serializer(SerdeSerializer::<Integer>::new()),
        )
        .register_type(
            TypeInfo::new::<Text>("text")
                .with_user_name("text")
                .with_renderer(render_text)
                .with_serializer(FnSerializer::new(
                    |t: &Text| t.0.clone(),
                    |s| Some(Text(s.to_string())),
                )),
        )
        .register_type(
            TypeInfo::new::<Counter>("counter")
                .with_user_name("counter")
                .with_renderer(|c: &Counter, _| format!("#{}", c.get()))
                .with_serializer(FnSerializer::new(
                    |c: &Counter| c.get().to_string(),
                    |s| s.parse().ok().map(Counter::new),
                ))
                .with_changer(CounterChanger),
        )
        .register_converter(Converter::new(|i: &Integer| Some(Text(i.0.to_string()))))
        .register_converter(Converter::new(|t: &Text| t.0.trim().parse().ok().map(Integer)))
        .build_shared()
        .expect("sample registry is valid")
}

pub fn integer_literal(
    registry: &Arc<Registry>,
    values: &[i64],
    quantifier: Quantifier,
) -> Arc<SimpleLiteral> {
    let literal = SimpleLiteral::of(
        Arc::clone(registry),
        values.iter().copied().map(Integer),
        quantifier,
    )
    .expect("integer literal needs at least one value");
    Arc::new(literal)
}

pub fn text_literal(
    registry: &Arc<Registry>,
    values: &[&str],
    quantifier: Quantifier,
) -> Arc<SimpleLiteral> {
    let literal = SimpleLiteral::of(
        Arc::clone(registry),
        values.iter().map(|s| Text((*s).to_string())),
        quantifier,
    )
    .expect("text literal needs at least one value");
    Arc::new(literal)
}

pub fn counter_literal(registry: &Arc<Registry>, values: &[i64]) -> Arc<SimpleLiteral> {
    let literal = SimpleLiteral::of(
        Arc::clone(registry),
        values.iter().copied().map(Counter::new),
        Quantifier::And,
    )
    .expect("counter literal needs at least one value");
    Arc::new(literal)
}

pub fn integers_of(literal: &dyn Literal) -> Vec<i64> {
    literal
        .all_values()
        .iter()
        .filter_map(|v| v.downcast_ref::<Integer>().map(|i| i.0))
        .collect()
}

pub fn texts_of(literal: &dyn Literal) -> Vec<String> {
    literal
        .all_values()
        .iter()
        .filter_map(|v| v.downcast_ref::<Text>().map(|t| t.0.clone()))
        .collect()
}

pub fn counts_of(literal: &dyn Literal) -> Vec<i64> {
    literal
        .all_values()
        .iter()
        .filter_map(|v| v.downcast_ref::<Counter>().map(Counter::get))
        .collect()
}
