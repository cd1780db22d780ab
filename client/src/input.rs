use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Attack,
    HeavyAttack,
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Attack, MouseButton::Left);
    input_map.insert(InputAction::HeavyAttack, MouseButton::Right);
    input_map.insert(InputAction::MoveForward, KeyCode::KeyW);
    input_map.insert(InputAction::MoveBack, KeyCode::KeyS);
    input_map.insert(InputAction::MoveLeft, KeyCode::KeyA);
    input_map.insert(InputAction::MoveRight, KeyCode::KeyD);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}
