fn main() {
    scene_behaviors::game::run();
}
