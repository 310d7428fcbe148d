//! Unit and behavioural tests for `parfor_syntax`.

mod behaviour;
