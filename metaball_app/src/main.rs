//! Metaball demo: renders one frame through each pipeline
//!
//! Builds a small mesh scene (a lit cube over a floor quad, plus an unlit
//! light marker) and a metaball field (a large center ball with a grid of
//! satellites), renders both through their pipelines, and writes the
//! frames out as PNG files.
//!
//! Settings load from `render.toml` next to the working directory when it
//! exists; otherwise the defaults apply.

use std::error::Error;

use basalt_engine::foundation::logging;
use basalt_engine::foundation::math::utils::deg_to_rad;
use basalt_engine::foundation::math::Quat;
use basalt_engine::prelude::*;

const SETTINGS_PATH: &str = "render.toml";

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let settings = load_settings();
    log::info!(
        "rendering {}x{} frames",
        settings.width,
        settings.height
    );

    render_mesh_scene(&settings)?;
    render_metaball_scene(&settings)?;
    Ok(())
}

fn load_settings() -> RenderSettings {
    if std::path::Path::new(SETTINGS_PATH).exists() {
        match RenderSettings::load_from_file(SETTINGS_PATH) {
            Ok(settings) => return settings,
            Err(err) => log::warn!("failed to load {SETTINGS_PATH}: {err}"),
        }
    }
    RenderSettings::default()
}

fn camera_for(settings: &RenderSettings, eye: Vec3, target: Vec3) -> Result<Camera, SceneError> {
    Camera::look_at(
        eye,
        target,
        Vec3::new(0.0, 1.0, 0.0),
        deg_to_rad(settings.fov_y_degrees),
        settings.aspect(),
        settings.near,
        settings.far,
    )
}

fn render_mesh_scene(settings: &RenderSettings) -> Result<(), Box<dyn Error>> {
    let camera = camera_for(settings, Vec3::new(2.5, 2.0, 4.0), Vec3::zeros())?;

    // Floor: a quad rotated flat, normal up.
    let mut floor_transform = Transform::from_position_scale(
        Vec3::new(0.0, -0.8, 0.0),
        Vec3::new(6.0, 6.0, 1.0),
    );
    floor_transform.rotation =
        Quat::from_axis_angle(&Vec3::x_axis(), -std::f32::consts::FRAC_PI_2);
    let floor = MeshObject::lit(
        VertexStream::structured(shapes::quad([0.35, 0.35, 0.4]))?,
        ModelTransform::from_transform(&floor_transform)?,
        0.1,
        8.0,
    )?;

    let mut cube_transform = Transform::from_position(Vec3::new(0.0, 0.0, 0.0));
    cube_transform.rotation = Quat::from_axis_angle(&Vec3::y_axis(), deg_to_rad(30.0));
    let cube = MeshObject::lit(
        VertexStream::structured(shapes::cube([0.8, 0.25, 0.15]))?,
        ModelTransform::from_transform(&cube_transform)?,
        0.8,
        64.0,
    )?;

    let key_light =
        PointLight::new(Vec3::new(2.0, 3.0, 2.0), Vec3::new(1.0, 0.95, 0.85), 8.0)?;
    let fill_light =
        PointLight::new(Vec3::new(-3.0, 1.5, 1.0), Vec3::new(0.3, 0.4, 1.0), 4.0)?;
    let lights = PointLightSet::from_slice(&[key_light, fill_light])?;
    let ambient = AmbientLight::new(Vec3::new(1.0, 1.0, 1.0), 0.15)?;

    // Unlit marker at the key light so it shows up in the frame.
    let marker = MeshObject::unlit(
        VertexStream::structured(shapes::quad([1.0, 0.95, 0.85]))?,
        ModelTransform::from_transform(&Transform::from_position_scale(
            key_light.position,
            Vec3::new(0.2, 0.2, 1.0),
        ))?,
    );

    let mut renderer = DeferredRenderer::new(settings.width, settings.height)?;
    renderer.start(&camera, &Vec3::from(settings.clear_color))?;
    renderer.draw_object(&floor)?;
    renderer.draw_object(&cube)?;
    renderer.draw_object(&marker)?;
    renderer.draw_point_lights(&lights)?;
    renderer.draw_ambient(&ambient)?;
    let frame = renderer.finish()?;

    save_png(frame, "deferred.png")
}

fn render_metaball_scene(settings: &RenderSettings) -> Result<(), Box<dyn Error>> {
    let camera = camera_for(settings, Vec3::new(0.0, 1.5, 7.0), Vec3::zeros())?;

    let mut field = MetaballField::new();
    field.push(Metaball::new(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.9, 0.2, 0.2),
        1.2,
    )?)?;
    // A 3x3 grid of satellites behind the center ball.
    for row in 0..3u8 {
        for column in 0..3u8 {
            let position = Vec3::new(
                (f32::from(column) - 1.0) * 1.6,
                (f32::from(row) - 1.0) * 1.6,
                -2.0,
            );
            let color = Vec3::new(
                0.2 + 0.3 * f32::from(column),
                0.3,
                0.2 + 0.3 * f32::from(row),
            );
            field.push(Metaball::new(position, color, 0.6)?)?;
        }
    }

    let light = PointLight::new(Vec3::new(3.0, 4.0, 6.0), Vec3::new(1.0, 1.0, 1.0), 30.0)?;
    let lights = PointLightSet::from_slice(&[light])?;
    let ambient = AmbientLight::new(Vec3::new(1.0, 1.0, 1.0), 0.12)?;

    let mut renderer =
        MarchedRenderer::new(settings.width, settings.height, settings.march)?;
    renderer.set_material(0.6, 32.0)?;
    let frame = renderer.render(
        &camera,
        &field,
        &lights,
        &ambient,
        &Vec3::from(settings.clear_color),
    );

    save_png(frame, "marched.png")
}

fn save_png(target: &RenderTarget, path: &str) -> Result<(), Box<dyn Error>> {
    let image =
        image::RgbaImage::from_raw(target.width(), target.height(), target.to_rgba8())
            .ok_or("pixel buffer does not match target dimensions")?;
    image.save(path)?;
    log::info!("wrote {path}");
    Ok(())
}
